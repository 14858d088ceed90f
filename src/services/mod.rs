pub mod settlement_sweeper;
