// Services module for the update pipeline stages
pub mod artifact_installer;
pub mod change_tracker;
pub mod command_runner;
pub mod git;
pub mod proposal_publisher;
pub mod release_client;
pub mod review_client;
pub mod source_patch;
pub mod update_workflow;
pub mod validation_gate;
