pub mod cache;
pub mod database;
pub mod matcher;
pub mod sample_data;
pub mod store;
pub mod supabase;
pub mod time_slots;
