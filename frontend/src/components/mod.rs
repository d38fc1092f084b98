pub mod device_form;
