/// Catch-all result for startup/config paths where the error is only reported.
pub type AnyResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
