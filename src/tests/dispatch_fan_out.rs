// Fan-out of one like request across every cached token of a region.
// The game server is mocked per bearer token so single calls can fail or stall
// while their siblings complete.

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::time::Duration;

    use httpmock::Method::POST;
    use httpmock::MockServer;

    use crate::cache::token::Region;
    use crate::config::settings::PayloadConfig;
    use crate::dispatch::payload::LikePayload;
    use crate::dispatch::{DispatchResult, LikeDispatcher};
    use crate::tests::common::{build_cache, mock_issuer_tokens, write_credentials, TEST_IV, TEST_KEY};

    fn dispatcher(issuer_url: &str, game_url: &str, dir: &Path, timeout: Duration) -> LikeDispatcher {
        let cache = build_cache(issuer_url, dir, Duration::from_secs(3600));
        let mut servers = BTreeMap::new();
        servers.insert(Region::from("BR"), game_url.to_owned());
        let payload = LikePayload::new(&PayloadConfig {
            key: TEST_KEY.to_owned(),
            iv: TEST_IV.to_owned(),
        })
        .unwrap();
        LikeDispatcher::new(cache, servers, payload, timeout)
    }

    #[tokio::test]
    async fn every_token_sends_one_like() {
        let issuer = MockServer::start_async().await;
        let game = MockServer::start_async().await;
        mock_issuer_tokens(&issuer, &["1", "2", "3"]).await;
        let likes = game
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/LikeProfile")
                    .header_exists("Authorization")
                    .header("ReleaseVersion", "OB51")
                    .header("X-Unity-Version", "2018.4.11f1");
                then.status(200).body("ok");
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "BR", &["1", "2", "3"]);

        let dispatcher = dispatcher(&issuer.url("/token"), &game.base_url(), dir.path(), Duration::from_secs(2));
        let result = dispatcher.send_likes("123456789", &Region::from("BR")).await.unwrap();

        assert_eq!(result, DispatchResult { attempted: 3, succeeded: 3 });
        assert_eq!(likes.hits_async().await, 3);
    }

    #[tokio::test]
    async fn failed_calls_lower_succeeded_only() {
        let issuer = MockServer::start_async().await;
        let game = MockServer::start_async().await;
        mock_issuer_tokens(&issuer, &["1", "2", "3"]).await;
        let rejected = game
            .mock_async(|when, then| {
                when.method(POST).path("/LikeProfile").header("Authorization", "Bearer jwt-2");
                then.status(500);
            })
            .await;
        game.mock_async(|when, then| {
            when.method(POST).path("/LikeProfile").header("Authorization", "Bearer jwt-1");
            then.status(200);
        })
        .await;
        game.mock_async(|when, then| {
            when.method(POST).path("/LikeProfile").header("Authorization", "Bearer jwt-3");
            then.status(200);
        })
        .await;
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "BR", &["1", "2", "3"]);

        let dispatcher = dispatcher(&issuer.url("/token"), &game.base_url(), dir.path(), Duration::from_secs(2));
        let result = dispatcher.send_likes("123456789", &Region::from("BR")).await.unwrap();

        assert_eq!(result, DispatchResult { attempted: 3, succeeded: 2 });
        assert_eq!(rejected.hits_async().await, 1);
    }

    #[tokio::test]
    async fn slow_call_times_out_without_cancelling_siblings() {
        let issuer = MockServer::start_async().await;
        let game = MockServer::start_async().await;
        mock_issuer_tokens(&issuer, &["1", "2"]).await;
        game.mock_async(|when, then| {
            when.method(POST).path("/LikeProfile").header("Authorization", "Bearer jwt-1");
            then.status(200).delay(Duration::from_secs(2));
        })
        .await;
        game.mock_async(|when, then| {
            when.method(POST).path("/LikeProfile").header("Authorization", "Bearer jwt-2");
            then.status(200);
        })
        .await;
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "BR", &["1", "2"]);

        let dispatcher = dispatcher(&issuer.url("/token"), &game.base_url(), dir.path(), Duration::from_millis(300));
        let result = dispatcher.send_likes("42", &Region::from("BR")).await.unwrap();

        assert_eq!(result, DispatchResult { attempted: 2, succeeded: 1 });
    }

    #[tokio::test]
    async fn no_tokens_short_circuits_without_network_calls() {
        let issuer = MockServer::start_async().await;
        let game = MockServer::start_async().await;
        let likes = game
            .mock_async(|when, then| {
                when.method(POST).path("/LikeProfile");
                then.status(200);
            })
            .await;
        let dir = tempfile::tempdir().unwrap();

        let dispatcher = dispatcher(&issuer.url("/token"), &game.base_url(), dir.path(), Duration::from_secs(2));
        let result = dispatcher.send_likes("123456789", &Region::from("BR")).await.unwrap();

        assert_eq!(result, DispatchResult { attempted: 0, succeeded: 0 });
        assert_eq!(likes.hits_async().await, 0);
    }

    #[tokio::test]
    async fn three_accounts_two_issued_two_likes() {
        let issuer = MockServer::start_async().await;
        let game = MockServer::start_async().await;
        mock_issuer_tokens(&issuer, &["1", "2"]).await;
        issuer
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/token").query_param("uid", "3");
                then.status(401);
            })
            .await;
        let likes = game
            .mock_async(|when, then| {
                when.method(POST).path("/LikeProfile");
                then.status(200);
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "BR", &["1", "2", "3"]);

        let dispatcher = dispatcher(&issuer.url("/token"), &game.base_url(), dir.path(), Duration::from_secs(2));
        let result = dispatcher.send_likes("123456789", &Region::from("BR")).await.unwrap();

        assert_eq!(result, DispatchResult { attempted: 2, succeeded: 2 });
        assert_eq!(likes.hits_async().await, 2);
    }

    #[tokio::test]
    async fn unknown_region_and_bad_uid_are_errors() {
        let issuer = MockServer::start_async().await;
        let game = MockServer::start_async().await;
        mock_issuer_tokens(&issuer, &["1"]).await;
        let dir = tempfile::tempdir().unwrap();
        write_credentials(dir.path(), "BR", &["1"]);

        let dispatcher = dispatcher(&issuer.url("/token"), &game.base_url(), dir.path(), Duration::from_secs(2));

        assert!(dispatcher.send_likes("1", &Region::from("EU")).await.is_err());
        assert!(dispatcher.send_likes("not-a-uid", &Region::from("BR")).await.is_err());
    }
}
