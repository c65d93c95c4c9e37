pub mod base;
pub mod configs;
pub mod cortex;
pub mod here;
pub mod snowflake;

#[cfg(test)]
pub mod mock;
