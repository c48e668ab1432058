//! Request lifecycle service.
//!
//! Policy layer for the item request state machine:
//!
//! ```text
//!  [none] --submit (no blocking record)--> Pending
//!  Pending --accept (owner)--> Accepted   (siblings Pending -> Rejected,
//!                                          item status -> requested)
//!  Pending --reject (owner)--> Rejected
//! ```
//!
//! `Accepted` frees the (item, requester) pair for a new submission;
//! `Rejected` keeps blocking it.

use crate::{
    error::{AppError, AppResult},
    models::request::{ItemRequest, RequestDetails, RequestStatus, SubmitOutcome},
    repository::Repository,
};

#[derive(Clone)]
pub struct RequestsService {
    repository: Repository,
}

impl RequestsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Submit a request for an item on behalf of a user.
    ///
    /// Owners cannot request their own items. When a blocking request
    /// already exists for the pair, it is returned unchanged instead of a
    /// new row.
    pub async fn submit_request(
        &self,
        item_id: i32,
        requester_id: i32,
    ) -> AppResult<SubmitOutcome> {
        let item = self.repository.items.get_by_id(item_id).await?;

        if item.owner_id == requester_id {
            return Err(AppError::SelfRequest);
        }

        let outcome = self.repository.requests.submit(item_id, requester_id).await?;

        match &outcome {
            SubmitOutcome::Created(request) => {
                tracing::info!(
                    request_id = request.id,
                    item_id,
                    requester_id,
                    "request created"
                );
            }
            SubmitOutcome::AlreadyRequested(existing) => {
                tracing::debug!(
                    request_id = existing.id,
                    status = %existing.status,
                    "submission blocked by existing request"
                );
            }
        }

        Ok(outcome)
    }

    /// Accept a request (item owner only)
    pub async fn accept_request(
        &self,
        request_id: i32,
        acting_user_id: i32,
    ) -> AppResult<ItemRequest> {
        let accepted = self.repository.requests.accept(request_id, acting_user_id).await?;
        tracing::info!(
            request_id,
            item_id = accepted.item_id,
            "request accepted, siblings rejected"
        );
        Ok(accepted)
    }

    /// Reject a request (item owner only)
    pub async fn reject_request(
        &self,
        request_id: i32,
        acting_user_id: i32,
    ) -> AppResult<ItemRequest> {
        let rejected = self.repository.requests.reject(request_id, acting_user_id).await?;
        tracing::info!(request_id, "request rejected");
        Ok(rejected)
    }

    /// Requests received on the user's own items
    pub async fn list_received(
        &self,
        owner_id: i32,
        status: Option<RequestStatus>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<RequestDetails>, i64)> {
        self.repository
            .requests
            .list_for_owner(owner_id, status, page, per_page)
            .await
    }

    /// Requests the user has made
    pub async fn list_sent(
        &self,
        requester_id: i32,
        status: Option<RequestStatus>,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<RequestDetails>, i64)> {
        self.repository
            .requests
            .list_for_requester(requester_id, status, page, per_page)
            .await
    }

    /// Request details, visible only to the requester or the item owner
    pub async fn get_detail(&self, request_id: i32, viewer_id: i32) -> AppResult<RequestDetails> {
        let details = self.repository.requests.get_details_by_id(request_id).await?;

        if details.requested_by.id != viewer_id && details.item.owner_id != viewer_id {
            return Err(AppError::Authorization(
                "You do not have permission to view this request".to_string(),
            ));
        }

        Ok(details)
    }

    /// Sent and received requests in one pass, for the history view
    pub async fn history(
        &self,
        user_id: i32,
        status: Option<RequestStatus>,
    ) -> AppResult<(Vec<RequestDetails>, Vec<RequestDetails>)> {
        let (sent, _) = self
            .repository
            .requests
            .list_for_requester(user_id, status, 1, i64::MAX)
            .await?;
        let (received, _) = self
            .repository
            .requests
            .list_for_owner(user_id, status, 1, i64::MAX)
            .await?;
        Ok((sent, received))
    }

    /// Count of pending requests on the user's items
    pub async fn pending_count(&self, owner_id: i32) -> AppResult<i64> {
        self.repository.requests.pending_count(owner_id).await
    }
}
