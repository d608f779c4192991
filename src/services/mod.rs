pub mod cart_service;
pub mod reminder_service;
