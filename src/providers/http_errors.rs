use anyhow::anyhow;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

/// Rewrites a failed send into something the user can act on.
pub(crate) fn completion_request_error(err: reqwest::Error, api_url: &str) -> anyhow::Error {
    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by completion endpoint at '{}'. \
                 Check that OPENAI_AZURE_ENDPOINT is correct.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to completion endpoint at '{}'. \
             Check OPENAI_AZURE_ENDPOINT and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call completion endpoint at '{}': {}", api_url, err)
}

pub(crate) fn completion_status_error(status: StatusCode, body: &str) -> anyhow::Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => anyhow!(
            "Completion endpoint rejected the credentials (status {}). \
             Check OPENAI_AZURE_KEY. Response: {}",
            status,
            body
        ),
        StatusCode::NOT_FOUND => anyhow!(
            "Completion endpoint returned status {}. \
             Check OPENAI_AZURE_DEPLOYMENT and OPENAI_AZURE_API_VERSION. Response: {}",
            status,
            body
        ),
        _ => anyhow!("Completion request failed with status {}: {}", status, body),
    }
}
