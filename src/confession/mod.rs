//! The confession pipeline: gate, setup rules, and the submit/decide/publish workflow.
//! Nothing in here talks to Discord directly; that goes through [`workflow::Delivery`].

pub mod gate;
pub mod setup;
pub mod workflow;
