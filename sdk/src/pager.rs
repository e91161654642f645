use crate::client::ArmClient;
use crate::common::{ArmError, ArmResult};
use crate::model::ArmList;
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;

/// Walks an ARM list endpoint page by page, following `nextLink`.
pub struct Pager<T> {
    client: Arc<ArmClient>,
    operation: String,
    next: Option<String>,
    pages_read: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Pager<T> {
    pub fn new(client: Arc<ArmClient>, operation: &str, url: &str) -> Self {
        Self {
            client,
            operation: operation.to_string(),
            next: Some(url.to_string()),
            pages_read: 0,
            _item: PhantomData,
        }
    }

    /// `true` while another page can be requested.
    pub fn more(&self) -> bool {
        self.next.is_some()
    }

    pub fn pages_read(&self) -> usize {
        self.pages_read
    }

    /// Fetches the current page and advances to its `nextLink`.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::InvalidState`] when called after the last page.
    pub async fn next_page(&mut self) -> ArmResult<Vec<T>> {
        let url = self.next.take().ok_or_else(|| {
            ArmError::InvalidState(format!("{}: no more pages", self.operation))
        })?;

        let page: ArmList<T> = match self.client.get_json(&self.operation, &url).await {
            Ok(page) => page,
            Err(e) => {
                // Keep the link so the caller can retry the same page
                self.next = Some(url);
                return Err(e);
            }
        };

        self.pages_read += 1;
        self.next = page.next_link.filter(|link| !link.trim().is_empty());
        log::debug!(
            "{}: page {} with {} items, more: {}",
            self.operation,
            self.pages_read,
            page.value.len(),
            self.next.is_some()
        );
        Ok(page.value)
    }

    /// Drains every remaining page.
    pub async fn collect_all(mut self) -> ArmResult<Vec<T>> {
        let mut items = Vec::new();
        while self.more() {
            items.extend(self.next_page().await?);
        }
        Ok(items)
    }

    /// Items of all remaining pages as a stream; stops after the first error.
    pub fn into_stream(self) -> impl Stream<Item = ArmResult<T>> {
        let pages = stream::unfold(Some(self), |pager| async move {
            let mut pager = pager?;
            if !pager.more() {
                return None;
            }
            match pager.next_page().await {
                Ok(items) => Some((Ok(items), Some(pager))),
                Err(e) => Some((Err(e), None)),
            }
        });

        futures::StreamExt::flat_map(pages, |page| match page {
            Ok(items) => stream::iter(items.into_iter().map(Ok).collect::<Vec<_>>()),
            Err(e) => stream::iter(vec![Err(e)]),
        })
    }
}
