pub mod core;
pub mod session;

#[cfg(test)]
mod tests;
