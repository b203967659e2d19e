//! # StorageVault Tests
//!
//! `storage_vault.rs` の単体テスト。使い捨て HTTP スタブで
//! リクエストの形 (パス・認証・upsert) とステータス処理を検証する。

#[cfg(test)]
mod tests {
    use crate::storage_vault::StorageVault;
    use assembly_core::error::AssemblyError;
    use assembly_core::traits::ArtifactStore;
    use shared::config::Secret;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;

    /// 1接続だけ受け、受信した生リクエストを返す HTTP スタブ
    async fn spawn_capture_stub(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut captured = Vec::new();
            let mut buf = [0u8; 8192];

            // ヘッダとボディの先頭を受信してから応答する (テスト用ペイロードは小さい)
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        captured.extend_from_slice(&buf[..n]);
                        if captured.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;

            // クライアントが送信中のボディ残りを読み捨ててから閉じる
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }

            let _ = tx.send(String::from_utf8_lossy(&captured).to_string());
        });

        (format!("http://{}", addr), rx)
    }

    #[tokio::test]
    async fn test_publish_sends_authenticated_upsert() {
        let (base, captured) =
            spawn_capture_stub("200 OK", "{\"Key\":\"video/assembled/clip.mp4\"}").await;

        let dir = tempfile::TempDir::new().unwrap();
        let artifact = dir.path().join("clip.mp4");
        std::fs::write(&artifact, b"videodata").unwrap();

        let vault = StorageVault::new(
            reqwest::Client::new(),
            &base,
            Secret::new("test-service-key".to_string()),
            "test-bucket",
        );

        let receipt = vault
            .publish(&artifact, "video/assembled/clip.mp4")
            .await
            .unwrap();
        assert_eq!(receipt.remote_key, "video/assembled/clip.mp4");
        assert_eq!(receipt.byte_size, 9);

        let request = captured.await.unwrap().to_lowercase();
        assert!(request.contains("post /storage/v1/object/test-bucket/video/assembled/clip.mp4"));
        assert!(request.contains("authorization: bearer test-service-key"));
        assert!(request.contains("x-upsert: true"));
        assert!(request.contains("content-type: video/mp4"));
    }

    #[tokio::test]
    async fn test_publish_fails_on_rejected_status() {
        let (base, _captured) =
            spawn_capture_stub("400 Bad Request", "{\"error\":\"invalid key\"}").await;

        let dir = tempfile::TempDir::new().unwrap();
        let artifact = dir.path().join("clip.mp4");
        std::fs::write(&artifact, b"videodata").unwrap();

        let vault = StorageVault::new(
            reqwest::Client::new(),
            &base,
            Secret::new("test-service-key".to_string()),
            "test-bucket",
        );

        let res = vault.publish(&artifact, "video/assembled/clip.mp4").await;
        match res {
            Err(AssemblyError::Publish {
                remote_key,
                http_status,
                ..
            }) => {
                assert_eq!(remote_key, "video/assembled/clip.mp4");
                assert_eq!(http_status, Some(400));
            }
            other => panic!("expected Publish error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_publish_fails_on_missing_artifact() {
        let dir = tempfile::TempDir::new().unwrap();
        let vault = StorageVault::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            Secret::new("key".to_string()),
            "bucket",
        );

        let res = vault
            .publish(&dir.path().join("ghost.mp4"), "video/assembled/ghost.mp4")
            .await;
        match res {
            Err(AssemblyError::Publish {
                http_status, reason, ..
            }) => {
                assert_eq!(http_status, None);
                assert!(reason.contains("Artifact missing"));
            }
            other => panic!("expected Publish error, got {:?}", other.map(|_| ())),
        }
    }
}
