//! Integration tests for the tenantctl command pipeline

mod apppermission_remove;
mod cli_routing;
mod config_integration;
mod test_utils;
mod yammer_search;
