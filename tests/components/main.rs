//! Component tests, one module per source component


mod test_attributes;
mod test_bridge;
mod test_config;
mod test_registry;
