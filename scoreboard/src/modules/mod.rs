pub mod aggregator;
pub mod feed;
pub mod handlers;

#[cfg(test)]
pub mod stub;
