//! GraphQL documents used by [`GithubReviewGateway`](crate::GithubReviewGateway)
//!
//! Mutations take a single `$input` object so optional fields can simply be
//! left out instead of being sent as explicit nulls.

/// Node ID of a pull request
pub const PULL_REQUEST_ID: &str = r#"
query PullRequestId($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      id
    }
  }
}
"#;

/// One page of review threads with their comments
pub const REVIEW_THREADS: &str = r#"
query ReviewThreads($owner: String!, $repo: String!, $number: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      reviewThreads(first: $first, after: $after) {
        pageInfo {
          hasNextPage
          endCursor
        }
        nodes {
          id
          path
          line
          originalLine
          startLine
          originalStartLine
          diffSide
          isResolved
          isOutdated
          comments(first: $first) {
            pageInfo {
              hasNextPage
            }
            nodes {
              id
              body
              createdAt
              author {
                login
              }
              reactionGroups {
                content
                reactors {
                  totalCount
                }
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Authenticated user
pub const VIEWER: &str = r#"
query Viewer {
  viewer {
    login
    name
  }
}
"#;

pub const ADD_REVIEW_THREAD: &str = r#"
mutation AddReviewThread($input: AddPullRequestReviewThreadInput!) {
  addPullRequestReviewThread(input: $input) {
    thread {
      id
    }
  }
}
"#;

pub const SUBMIT_REVIEW: &str = r#"
mutation SubmitReview($input: SubmitPullRequestReviewInput!) {
  submitPullRequestReview(input: $input) {
    pullRequestReview {
      id
      state
    }
  }
}
"#;

pub const ADD_THREAD_REPLY: &str = r#"
mutation AddThreadReply($input: AddPullRequestReviewThreadReplyInput!) {
  addPullRequestReviewThreadReply(input: $input) {
    comment {
      id
    }
  }
}
"#;

pub const RESOLVE_THREAD: &str = r#"
mutation ResolveThread($input: ResolveReviewThreadInput!) {
  resolveReviewThread(input: $input) {
    thread {
      id
      isResolved
    }
  }
}
"#;

pub const UNRESOLVE_THREAD: &str = r#"
mutation UnresolveThread($input: UnresolveReviewThreadInput!) {
  unresolveReviewThread(input: $input) {
    thread {
      id
      isResolved
    }
  }
}
"#;

pub const UPDATE_COMMENT: &str = r#"
mutation UpdateComment($input: UpdatePullRequestReviewCommentInput!) {
  updatePullRequestReviewComment(input: $input) {
    pullRequestReviewComment {
      id
    }
  }
}
"#;

pub const DELETE_COMMENT: &str = r#"
mutation DeleteComment($input: DeletePullRequestReviewCommentInput!) {
  deletePullRequestReviewComment(input: $input) {
    pullRequestReview {
      id
    }
  }
}
"#;

pub const ADD_REACTION: &str = r#"
mutation AddReaction($input: AddReactionInput!) {
  addReaction(input: $input) {
    reaction {
      content
    }
  }
}
"#;
