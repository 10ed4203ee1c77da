mod common;

use edu_ws::{
    token::Token,
    ws::{Client, RequestError},
};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::FakeMoodle;

const TOKEN: &str = "6191f7ea9da0a4aed1cc9ddb23bf4aa7";

fn client(moodle: &FakeMoodle) -> Client {
    Client::new(
        reqwest::Client::new(),
        &moodle.site_url(),
        Token::new(TOKEN),
        None,
    )
}

#[tokio::test]
async fn missing_configuration_makes_no_request() {
    let moodle = FakeMoodle::start().await;
    moodle.reply("core_course_search_courses", json!({ "total": 0, "courses": [] }));

    let without_token = Client::new(reqwest::Client::new(), &moodle.site_url(), Token::default(), None);
    let without_url = Client::new(reqwest::Client::new(), "", Token::new(TOKEN), None);

    for client in [without_token, without_url] {
        assert!(!client.is_configured());
        let err = client.search_courses("x", 0, 50).await.unwrap_err();
        assert!(matches!(err, RequestError::MissingConfig));
        assert_eq!(
            err.to_string(),
            "Missing MOODLE_BASE_URL or MOODLE_TOKEN in environment."
        );
    }
    assert!(moodle.calls().is_empty());
}

#[tokio::test]
async fn sends_fixed_fields_and_parameters() {
    let moodle = FakeMoodle::start().await;
    moodle.reply(
        "core_course_search_courses",
        json!({ "total": 1, "courses": [{ "id": 4, "fullname": "Physics" }] }),
    );

    let result = client(&moodle).search_courses("phys", 2, 10).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.courses[0].name(), "Physics");

    let calls = moodle.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call["wstoken"], TOKEN);
    assert_eq!(call["wsfunction"], "core_course_search_courses");
    assert_eq!(call["moodlewsrestformat"], "json");
    assert_eq!(call["criterianame"], "search");
    assert_eq!(call["criteriavalue"], "phys");
    assert_eq!(call["page"], "2");
    assert_eq!(call["perpage"], "10");
    assert!(!call.contains_key("moodlewssettinglang"));
}

#[tokio::test]
async fn course_lookup_sends_id_as_string_field() {
    let moodle = FakeMoodle::start().await;
    moodle.reply(
        "core_course_get_courses_by_field",
        json!({ "courses": [{ "id": 9, "shortname": "BIO" }], "warnings": [] }),
    );

    let course = client(&moodle).get_course(9).await.unwrap().unwrap();
    assert_eq!(course.id, 9);
    assert_eq!(course.name(), "BIO");
    let calls = moodle.calls();
    assert_eq!(calls[0]["field"], "id");
    assert_eq!(calls[0]["value"], "9");
}

#[tokio::test]
async fn forum_lookup_sends_indexed_course_ids() {
    let moodle = FakeMoodle::start().await;
    moodle.reply(
        "mod_forum_get_forums_by_courses",
        json!([{ "id": 7, "course": 9, "name": "News", "type": "news", "cmid": 70 }]),
    );

    let forums = client(&moodle).get_forums_by_courses(&[9]).await.unwrap();
    assert_eq!(forums.len(), 1);
    assert_eq!(forums[0].course_module_id, Some(70));
    assert_eq!(moodle.calls()[0]["courseids[0]"], "9");
}

#[tokio::test]
async fn embedded_exception_becomes_error() {
    let moodle = FakeMoodle::start().await;
    moodle.reply(
        "mod_forum_get_discussion_posts",
        json!({
            "exception": "invalid_parameter_exception",
            "errorcode": "invalidparameter",
            "message": "Invalid parameter value detected"
        }),
    );

    let err = client(&moodle).get_discussion_posts(3).await.unwrap_err();
    match &err {
        RequestError::Exception(exception) => {
            assert_eq!(exception.error_code.as_deref(), Some("invalidparameter"));
        }
        err => panic!("unexpected error: {err:?}"),
    }
    assert_eq!(err.to_string(), "Moodle error: Invalid parameter value detected");
}

#[tokio::test]
async fn non_success_status_becomes_error() {
    let moodle = FakeMoodle::start().await;
    moodle.reply_with_status(
        "mod_forum_get_forum_discussions",
        StatusCode::SERVICE_UNAVAILABLE,
        json!({}),
    );

    let err = client(&moodle).get_forum_discussions(1).await.unwrap_err();
    assert!(err.is_http());
    assert_eq!(err.to_string(), "HTTP error: 503");
}

#[tokio::test]
async fn unexpected_shape_becomes_decode_error() {
    let moodle = FakeMoodle::start().await;
    moodle.reply("mod_forum_get_forums_by_courses", json!({ "forums": "nope" }));

    let err = client(&moodle).get_forums_by_courses(&[1]).await.unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)));
}

#[tokio::test]
async fn raw_calls_return_the_payload() {
    let moodle = FakeMoodle::start().await;
    moodle.reply("core_webservice_get_site_info", json!({ "sitename": "Campus" }));

    let value: Value = client(&moodle)
        .call("core_webservice_get_site_info", &())
        .await
        .unwrap();
    assert_eq!(value, json!({ "sitename": "Campus" }));
}

#[tokio::test]
async fn forced_language_is_sent() {
    let moodle = FakeMoodle::start().await;
    moodle.reply("mod_forum_get_forum_discussions", json!({ "discussions": [] }));

    let client = Client::new(
        reqwest::Client::new(),
        &moodle.site_url(),
        Token::new(TOKEN),
        Some("de".to_string()),
    );
    let discussions = client.get_forum_discussions(5).await.unwrap();
    assert!(discussions.discussions.is_empty());
    let calls = moodle.calls();
    assert_eq!(calls[0]["moodlewssettinglang"], "de");
    assert_eq!(calls[0]["forumid"], "5");
}
