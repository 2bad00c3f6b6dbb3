//! Integration tests for revsync-github
//!
//! Uses wiremock to simulate GitHub's GraphQL endpoint and verifies
//! end-to-end behavior of the GithubClient and GithubReviewGateway.

mod common;

mod test_client;
mod test_mutations;
mod test_threads;
