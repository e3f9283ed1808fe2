pub mod replay_storage;
