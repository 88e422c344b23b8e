mod cancellation;
mod common;
mod config_file;
mod engagement;
mod hardware_fault;
