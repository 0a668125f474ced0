//! # Core Scenario Tests
//!
//! Small programs run cycle by cycle on the whole core, checked through the
//! architectural state they leave behind.
