mod experiment_service;


pub use experiment_service::{ExperimentExport, ExperimentService, ExperimentServiceError, TradeReceipt};
