pub mod caption_pipeline;
pub mod data_store;
