pub mod template_helper;
