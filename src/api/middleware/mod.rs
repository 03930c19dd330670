pub mod request_metrics;
