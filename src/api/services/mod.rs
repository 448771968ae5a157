// Service layer
pub mod digimart_service;
pub mod jwt_service;
pub mod password;
pub mod quiz_codec;
