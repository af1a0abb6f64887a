mod common;

use common::{harness, harness_with_token, posts, session_for};
use nexora::{
    FeedError,
    models::{
        account::{ChangePasswordRequest, SignInRequest, SignUpRequest},
        media::ImageUpload,
        user::UserId,
    },
    repositories::session::SessionStore,
    services::{auth, mutations::RollbackPolicy, posts::create_post},
    validation::auth::PASSWORD_RULE,
};

const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn png(name: &str) -> ImageUpload {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.resize(256, 0);
    ImageUpload::new(name, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_persists_session() {
        let h = harness_with_token(Vec::new(), RollbackPolicy::Revert, None);

        let session = auth::sign_in(
            &h.state,
            SignInRequest {
                email: "ana@example.com".into(),
                password: "Str0ng!pass".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(session.subject(), &UserId::new("u1"));
        assert_eq!(
            h.sessions.load().await.unwrap().as_deref(),
            Some(session.token())
        );
        assert_eq!(h.api.calls(), vec!["sign_in ana@example.com"]);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_email_locally() {
        let h = harness_with_token(Vec::new(), RollbackPolicy::Revert, None);

        let err = auth::sign_in(
            &h.state,
            SignInRequest {
                email: "not-an-email".into(),
                password: "whatever".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FeedError::ValidationRejected(_)));
        assert_eq!(h.api.call_count(), 0);
        assert_eq!(h.sessions.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_in_failure_is_translated() {
        let h = harness_with_token(Vec::new(), RollbackPolicy::Revert, None);
        h.api.fail("sign_in", 401, Some("incorrect email or password"));

        let err = auth::sign_in(
            &h.state,
            SignInRequest {
                email: "ana@example.com".into(),
                password: "nope".into(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.user_message().as_deref(),
            Some("Email or password is incorrect")
        );
        assert_eq!(h.sessions.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_up_validates_before_calling() {
        let h = harness_with_token(Vec::new(), RollbackPolicy::Revert, None);
        let request = |re_password: &str| SignUpRequest {
            name: "Ana Lima".into(),
            email: "ana@example.com".into(),
            password: "Str0ng!pass".into(),
            re_password: re_password.into(),
            date_of_birth: "1995-04-12".into(),
            gender: "female".into(),
        };

        let err = auth::sign_up(&h.state, request("different"))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::ValidationRejected(_)));
        assert_eq!(h.api.call_count(), 0);

        auth::sign_up(&h.state, request("Str0ng!pass")).await.unwrap();
        assert_eq!(h.api.calls(), vec!["sign_up ana@example.com"]);
    }

    #[tokio::test]
    async fn test_change_password_always_signs_out() {
        for fail in [false, true] {
            let h = harness(Vec::new(), RollbackPolicy::Revert);
            if fail {
                h.api.fail("change_password", 400, Some("password is wrong"));
            }

            let result = auth::change_password(
                &h.state,
                &session_for("u1"),
                ChangePasswordRequest {
                    password: "Old!pass1".into(),
                    new_password: "New!pass2".into(),
                },
            )
            .await;

            assert_eq!(result.is_err(), fail);
            if let Err(err) = result {
                assert_eq!(
                    err.user_message().as_deref(),
                    Some("Current password is incorrect")
                );
            }
            assert_eq!(h.sessions.load().await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_weak_new_password_keeps_session() {
        let h = harness(Vec::new(), RollbackPolicy::Revert);

        let err = auth::change_password(
            &h.state,
            &session_for("u1"),
            ChangePasswordRequest {
                password: "Old!pass1".into(),
                new_password: "weak".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FeedError::ValidationRejected(ref m) if m.contains(PASSWORD_RULE)));
        assert_eq!(h.api.call_count(), 0);
        assert!(h.sessions.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_upload_photo_returns_refreshed_profile() {
        let h = harness(Vec::new(), RollbackPolicy::Revert);

        let profile = auth::upload_photo(&h.state, &session_for("u1"), png("me.png"))
            .await
            .unwrap();

        assert_eq!(
            profile.photo.as_deref(),
            Some("https://cdn.example.com/me.png")
        );
        assert_eq!(h.api.calls(), vec!["upload_photo me.png", "profile"]);
    }

    #[tokio::test]
    async fn test_upload_photo_rejects_non_images() {
        let h = harness(Vec::new(), RollbackPolicy::Revert);
        let session = session_for("u1");

        let empty = auth::upload_photo(&h.state, &session, ImageUpload::new("me.png", Vec::new()))
            .await
            .unwrap_err();
        let text = auth::upload_photo(
            &h.state,
            &session,
            ImageUpload::new("notes.txt", b"hello world".to_vec()),
        )
        .await
        .unwrap_err();

        assert_eq!(
            empty.user_message().as_deref(),
            Some("Please select a photo first")
        );
        assert!(matches!(text, FeedError::ValidationRejected(_)));
        assert_eq!(h.api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_post_sends_trimmed_body() {
        let h = harness(posts(1), RollbackPolicy::Revert);
        let session = session_for("u1");

        create_post(&h.state, &session, "  hello world  ", Some(png("sky.png")))
            .await
            .unwrap();

        assert_eq!(h.api.calls(), vec!["create_post hello world"]);
        let created = h.api.server_post("p2").unwrap();
        assert_eq!(created.body, "hello world");
        assert_eq!(
            created.image.as_deref(),
            Some("https://cdn.example.com/sky.png")
        );
    }

    #[tokio::test]
    async fn test_create_post_rejects_blank_body() {
        let h = harness(Vec::new(), RollbackPolicy::Revert);

        let err = create_post(&h.state, &session_for("u1"), " \n ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, FeedError::ValidationRejected(_)));
        assert_eq!(h.api.call_count(), 0);
    }
}
