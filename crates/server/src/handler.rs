//! Per-connection request handling.
//!
//! A connection carries exactly one request and one response.

use crate::dispatcher::Dispatcher;
use crate::error::{Result, ServerError};
use minicoin_api::{recv_package, send_package, CodecError, Request, Response};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

/// Read one request, dispatch it, write one response.
///
/// A request with an unknown kind still goes through the taint gate and is
/// then answered with a generic failure. Any other read or write problem is
/// returned to the caller, which only has to drop the connection.
pub async fn handle_connection<S>(
    stream: &mut S,
    dispatcher: &Dispatcher,
    io_timeout: Option<Duration>,
) -> Result<Response>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let response = match with_deadline(io_timeout, recv_package::<_, Request>(stream)).await? {
        Ok(request) => dispatcher.dispatch(&request),
        Err(CodecError::UnknownRequestKind(kind)) => dispatcher.reject_unknown(kind),
        Err(e) => return Err(e.into()),
    };

    with_deadline(io_timeout, send_package(stream, &response)).await??;
    Ok(response)
}

async fn with_deadline<F: Future>(deadline: Option<Duration>, fut: F) -> Result<F::Output> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ServerError::Timeout(limit)),
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minicoin_api::messages::encode_header;
    use minicoin_api::{FailReason, PackageType, Status};
    use minicoin_chain::Ledger;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_handles_one_request() {
        let dispatcher = Dispatcher::new(Ledger::default());
        let (mut client, mut server) = tokio::io::duplex(64);

        send_package(&mut client, &Request::transaction(7, 100)).await.unwrap();
        let served = handle_connection(&mut server, &dispatcher, None).await.unwrap();
        assert_eq!(served, Response::success(100));

        let received: Response = recv_package(&mut client).await.unwrap();
        assert_eq!(received, Response::success(100));
    }

    #[tokio::test]
    async fn test_unknown_kind_gets_generic_failure() {
        let dispatcher = Dispatcher::new(Ledger::default());
        let (mut client, mut server) = tokio::io::duplex(64);

        let mut bytes = encode_header(PackageType::ClientRequest).unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 5, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 100]);
        client.write_all(&bytes).await.unwrap();

        handle_connection(&mut server, &dispatcher, None).await.unwrap();

        let received: Response = recv_package(&mut client).await.unwrap();
        assert_eq!(received.status, Status::Failed);
        assert_eq!(received.fail_reason, FailReason::None);
        assert_eq!(dispatcher.ledger().lock().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_kind_on_tainted_chain_reports_taint() {
        let dispatcher = Dispatcher::new(Ledger::new(1));
        dispatcher.dispatch(&Request::transaction(7, 100));
        let (mut client, mut server) = tokio::io::duplex(64);

        let mut bytes = encode_header(PackageType::ClientRequest).unwrap();
        bytes.extend_from_slice(&[0, 0, 0, 5, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0, 100]);
        client.write_all(&bytes).await.unwrap();

        handle_connection(&mut server, &dispatcher, None).await.unwrap();

        let received: Response = recv_package(&mut client).await.unwrap();
        assert_eq!(received, Response::tainted());
        assert_eq!(received.fail_reason, FailReason::BlockchainTainted);
        assert!(received.chain_corrupted);
    }

    #[tokio::test]
    async fn test_truncated_request_is_error() {
        let dispatcher = Dispatcher::new(Ledger::default());
        let (mut client, mut server) = tokio::io::duplex(64);

        client.write_all(&[0, 0]).await.unwrap();
        drop(client);

        let result = handle_connection(&mut server, &dispatcher, None).await;
        assert!(matches!(result, Err(ServerError::Codec(CodecError::Io(_)))));
    }

    #[tokio::test]
    async fn test_wrong_package_type_is_error() {
        let dispatcher = Dispatcher::new(Ledger::default());
        let (mut client, mut server) = tokio::io::duplex(64);

        send_package(&mut client, &Response::success(1)).await.unwrap();

        let result = handle_connection(&mut server, &dispatcher, None).await;
        assert!(matches!(
            result,
            Err(ServerError::Codec(CodecError::UnexpectedPackage { .. }))
        ));
    }

    #[tokio::test]
    async fn test_silent_client_times_out() {
        let dispatcher = Dispatcher::new(Ledger::default());
        let (_client, mut server) = tokio::io::duplex(64);

        let limit = Duration::from_millis(20);
        let result = handle_connection(&mut server, &dispatcher, Some(limit)).await;
        assert!(matches!(result, Err(ServerError::Timeout(d)) if d == limit));
    }
}
