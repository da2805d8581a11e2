pub mod http;
pub mod modelslab;
pub mod output;
