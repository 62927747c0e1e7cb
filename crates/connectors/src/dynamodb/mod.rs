use crate::{
    credentials::{self, CredentialContext},
    error::{CredentialError, StoreError},
    store::{STORE_BATCH_CEILING, TableStore},
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    Client,
    error::{ProvideErrorMetadata, SdkError},
    types::{PutRequest, WriteRequest},
};
use model::{
    pagination::{Cursor, FetchResult},
    record::Record,
};
use tracing::debug;

pub mod convert;

/// DynamoDB-backed table store. One instance per credential context; the
/// source and destination of a copy job each get their own.
#[derive(Debug, Clone)]
pub struct DynamoTable {
    client: Client,
}

impl DynamoTable {
    /// Resolves the credential context (profile, region, optional role
    /// assumption) and builds a client from it.
    pub async fn connect(ctx: &CredentialContext) -> Result<Self, CredentialError> {
        let config = credentials::resolve(ctx).await?;
        Ok(Self {
            client: Client::new(&config),
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TableStore for DynamoTable {
    async fn scan_page(
        &self,
        table: &str,
        cursor: &Cursor,
        page_size: usize,
    ) -> Result<FetchResult, StoreError> {
        let mut request = self
            .client
            .scan()
            .table_name(table)
            .limit(page_size.max(1) as i32);

        if let Cursor::At(key) = cursor {
            request = request.set_exclusive_start_key(Some(convert::key_to_item(key)));
        }

        let output = request.send().await.map_err(sdk_error)?;

        let mut records = Vec::new();
        for item in output.items.unwrap_or_default() {
            records.push(convert::record_from_item(item)?);
        }

        let next_cursor = match output.last_evaluated_key {
            Some(key) => Some(convert::key_from_item(key)?),
            None => None,
        };

        debug!(
            table,
            records = records.len(),
            has_cursor = next_cursor.is_some(),
            "Scanned page"
        );

        Ok(FetchResult {
            records,
            next_cursor,
        })
    }

    async fn write_batch(
        &self,
        table: &str,
        records: &[Record],
    ) -> Result<Vec<Record>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        if records.len() > STORE_BATCH_CEILING {
            return Err(StoreError::BatchTooLarge {
                submitted: records.len(),
                ceiling: STORE_BATCH_CEILING,
            });
        }

        let mut requests = Vec::with_capacity(records.len());
        for record in records {
            let put = PutRequest::builder()
                .set_item(Some(convert::record_to_item(record)))
                .build()
                .map_err(|err| StoreError::Encoding(err.to_string()))?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }

        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(sdk_error)?;

        let mut unprocessed = Vec::new();
        if let Some(mut leftover) = output.unprocessed_items {
            for request in leftover.remove(table).unwrap_or_default() {
                if let Some(put) = request.put_request {
                    unprocessed.push(convert::record_from_item(put.item)?);
                }
            }
        }

        debug!(
            table,
            submitted = records.len(),
            unprocessed = unprocessed.len(),
            "Submitted write batch"
        );

        Ok(unprocessed)
    }

    async fn key_names(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let output = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(sdk_error)?;

        let description = output.table.ok_or_else(|| {
            StoreError::Unexpected(format!("describe_table returned no description for {table}"))
        })?;

        Ok(description
            .key_schema
            .unwrap_or_default()
            .into_iter()
            .map(|element| element.attribute_name)
            .collect())
    }
}

/// Maps an SDK failure into the store error taxonomy. Service errors are
/// classified by error code; transport-level failures by their kind.
fn sdk_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());

    match &err {
        SdkError::TimeoutError(_) => StoreError::Timeout(message),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => StoreError::Timeout(message),
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreError::ServiceUnavailable(message)
        }
        SdkError::ServiceError(_) => classify_service_code(code.as_deref(), message),
        _ => StoreError::Unexpected(message),
    }
}

fn classify_service_code(code: Option<&str>, message: String) -> StoreError {
    match code {
        Some("ProvisionedThroughputExceededException")
        | Some("ThrottlingException")
        | Some("RequestLimitExceeded") => StoreError::Throttled(message),
        Some("InternalServerError") | Some("ServiceUnavailable") => {
            StoreError::ServiceUnavailable(message)
        }
        Some("ResourceNotFoundException") => StoreError::TableNotFound(message),
        Some("ExpiredTokenException") | Some("ExpiredToken") | Some("TokenRefreshRequired") => {
            StoreError::ExpiredCredentials(message)
        }
        Some("AccessDeniedException")
        | Some("UnrecognizedClientException")
        | Some("MissingAuthenticationTokenException")
        | Some("InvalidSignatureException") => StoreError::AccessDenied(message),
        Some("ValidationException")
        | Some("ConditionalCheckFailedException")
        | Some("ItemCollectionSizeLimitExceededException") => {
            StoreError::ValidationRejected(message)
        }
        _ => StoreError::Unexpected(message),
    }
}
