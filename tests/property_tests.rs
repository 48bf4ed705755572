use echoload::client::TaskRecord;
use echoload::common::spawn_test_server;
use proptest::prelude::*;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Property: the server returns exactly the bytes it was sent, whatever
    /// its buffer size relative to the payload
    #[test]
    fn echo_preserves_data(
        data in prop::collection::vec(any::<u8>(), 1..4096),
        buffer_size in 1usize..2048,
    ) {
        tokio_test::block_on(async {
            let server = spawn_test_server(buffer_size).await
                .map_err(|e| TestCaseError::fail(format!("Server setup failed: {}", e)))?;

            let mut stream = TcpStream::connect(server.addr).await
                .map_err(|e| TestCaseError::fail(format!("Client connection failed: {}", e)))?;

            stream.write_all(&data).await
                .map_err(|e| TestCaseError::fail(format!("Write failed: {}", e)))?;
            let mut response = vec![0u8; data.len()];
            stream.read_exact(&mut response).await
                .map_err(|e| TestCaseError::fail(format!("Read failed: {}", e)))?;

            drop(stream);
            server.shutdown().await
                .map_err(|e| TestCaseError::fail(format!("Shutdown failed: {}", e)))?;

            // Property: response should be identical to input
            prop_assert_eq!(response, data);
            Ok(())
        })?;
    }

    /// Property: however a conversation ends, received never exceeds sent and
    /// the average is the total divided by replies
    #[test]
    fn record_invariants_hold(
        latencies_us in prop::collection::vec(0u64..5_000_000, 0..50),
        failed_last_send in any::<bool>(),
        lost_reply in any::<bool>(),
    ) {
        let mut record = TaskRecord::new("prop-0", "localhost", 8080);
        record.connection_established = true;

        for us in &latencies_us {
            record.record_sent();
            record.record_round_trip(Duration::from_micros(*us));
        }
        if failed_last_send {
            record.record_error("Error sending message: broken pipe");
        } else if lost_reply {
            record.record_sent();
            record.record_error(echoload::client::PREMATURE_CLOSE);
        }

        let record = record.finalize();
        prop_assert!(record.messages_received <= record.messages_sent);
        prop_assert!(record.total_latency_ms >= 0.0);
        if record.messages_received > 0 {
            let expected = record.total_latency_ms / record.messages_received as f64;
            prop_assert!((record.average_latency_ms - expected).abs() < 1e-9);
        } else {
            prop_assert_eq!(record.average_latency_ms, 0.0);
        }
        prop_assert_eq!(record.is_success(), record.errors.is_empty());
    }
}
