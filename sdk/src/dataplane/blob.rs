use super::sas::SAS_VERSION;
use super::{build_http_client, execute};
use crate::common::{ArmError, ArmResult, HttpError, RetryOptions};
use reqwest::header::CONTENT_TYPE;

/// Blob service client authorized by an account SAS.
#[derive(Debug, Clone)]
pub struct BlobClient {
    http: reqwest::Client,
    endpoint: String,
    sas: String,
    retry: RetryOptions,
}

impl BlobClient {
    /// Client for `https://{account}.blob.core.windows.net`.
    pub fn new(account: &str, sas: &str) -> ArmResult<Self> {
        Self::with_endpoint(&format!("https://{account}.blob.core.windows.net"), sas)
    }

    pub fn with_endpoint(endpoint: &str, sas: &str) -> ArmResult<Self> {
        Ok(Self {
            http: build_http_client()?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            sas: sas.trim_start_matches('?').to_string(),
            retry: RetryOptions::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryOptions) -> Self {
        self.retry = retry;
        self
    }

    fn blob_url(&self, container: &str, blob: &str) -> String {
        // Keep '/' so virtual directories survive
        let blob = blob
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}?{}",
            self.endpoint,
            urlencoding::encode(container),
            blob,
            self.sas
        )
    }

    /// Uploads `data` as a block blob, replacing any existing blob.
    pub async fn upload(
        &self,
        container: &str,
        blob: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> ArmResult<()> {
        let request = self
            .http
            .put(self.blob_url(container, blob))
            .header("x-ms-version", SAS_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header(CONTENT_TYPE, content_type)
            .body(data);
        execute("blobs.upload", request, &self.retry).await?;
        log::debug!("Uploaded blob {container}/{blob}");
        Ok(())
    }

    pub async fn download(&self, container: &str, blob: &str) -> ArmResult<Vec<u8>> {
        let url = self.blob_url(container, blob);
        let request = self.http.get(&url).header("x-ms-version", SAS_VERSION);
        let response = execute("blobs.download", request, &self.retry).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| HttpError::from_reqwest(&url, &e))?;
        Ok(bytes.to_vec())
    }

    /// Names of every blob in `container`, following `NextMarker`.
    pub async fn list_blobs(&self, container: &str) -> ArmResult<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/{}?restype=container&comp=list&{}",
                self.endpoint,
                urlencoding::encode(container),
                self.sas
            );
            if let Some(marker) = &marker {
                url.push_str("&marker=");
                url.push_str(&urlencoding::encode(marker));
            }

            let request = self.http.get(&url).header("x-ms-version", SAS_VERSION);
            let response = execute("blobs.list", request, &self.retry).await?;
            let body = response
                .text()
                .await
                .map_err(|e| HttpError::from_reqwest(&url, &e))?;

            let (page, next) = parse_blob_list(&body)?;
            names.extend(page);
            match next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    pub async fn delete(&self, container: &str, blob: &str) -> ArmResult<()> {
        let request = self
            .http
            .delete(self.blob_url(container, blob))
            .header("x-ms-version", SAS_VERSION);
        execute("blobs.delete", request, &self.retry).await?;
        Ok(())
    }
}

/// Blob names and the continuation marker of one `List Blobs` page.
fn parse_blob_list(xml: &str) -> ArmResult<(Vec<String>, Option<String>)> {
    let xml = xml.trim_start_matches('\u{feff}');
    let doc = roxmltree::Document::parse(xml).map_err(|e| ArmError::deserialize("blobs.list", e))?;

    let names = doc
        .descendants()
        .filter(|node| node.has_tag_name("Blob"))
        .filter_map(|blob| {
            blob.children()
                .find(|child| child.has_tag_name("Name"))
                .and_then(|name| name.text())
        })
        .map(str::to_string)
        .collect();

    let next = doc
        .descendants()
        .find(|node| node.has_tag_name("NextMarker"))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|marker| !marker.is_empty())
        .map(str::to_string);

    Ok((names, next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_page() {
        let xml = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
            <EnumerationResults ServiceEndpoint=\"https://a.blob.core.windows.net/\" ContainerName=\"c\">\
            <Blobs>\
              <Blob><Name>hello.txt</Name><Properties><Content-Length>5</Content-Length></Properties></Blob>\
              <Blob><Name>dir/nested.json</Name><Properties/></Blob>\
            </Blobs>\
            <NextMarker>2!72!MDAwMDE0</NextMarker>\
            </EnumerationResults>";
        let (names, next) = parse_blob_list(xml).unwrap();
        assert_eq!(names, vec!["hello.txt", "dir/nested.json"]);
        assert_eq!(next.as_deref(), Some("2!72!MDAwMDE0"));
    }

    #[test]
    fn empty_marker_ends_listing() {
        let xml = "<EnumerationResults><Blobs/><NextMarker/></EnumerationResults>";
        let (names, next) = parse_blob_list(xml).unwrap();
        assert!(names.is_empty());
        assert!(next.is_none());
    }

    #[test]
    fn rejects_broken_xml() {
        assert!(matches!(
            parse_blob_list("<EnumerationResults>"),
            Err(ArmError::Deserialize { .. })
        ));
    }

    #[test]
    fn blob_url_encodes_segments() {
        let client = BlobClient::with_endpoint("https://acct.blob.core.windows.net/", "?sv=1&sig=x").unwrap();
        assert_eq!(
            client.blob_url("docs", "a dir/file 1.txt"),
            "https://acct.blob.core.windows.net/docs/a%20dir/file%201.txt?sv=1&sig=x"
        );
    }
}
