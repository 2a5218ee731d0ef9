pub mod descriptor;
pub mod transform;
pub mod usb_hiddev;
