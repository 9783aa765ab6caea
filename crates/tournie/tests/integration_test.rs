use rstest::rstest;
use tournie::services::Fixtures;
use tournie::{Bot, BotConfig, Deps};
use tournie_core::{Action, Message, Response, Template};

const ALICE: &str = "U024BE7LH";

fn demo() -> Fixtures {
    Fixtures::from_json(include_str!("../fixtures/demo.json")).expect("valid fixtures")
}

fn bot(fixtures: Fixtures) -> Bot {
    Bot::new(&BotConfig::default(), Deps::in_memory(fixtures)).expect("valid configuration")
}

fn text(sender: &str, text: &str) -> Message {
    Message::text(sender, text).with_command("/tournie")
}

fn apology(message: &str) -> Response {
    Template::with_text(format!(":crying_cat_face: There was an error: `{message}`."))
        .replace_original(false)
        .into()
}

#[tokio::test]
async fn test_whoami_before_and_after_connecting() {
    let bot = bot(Fixtures::default());

    let response = bot.handle(text("U1", "whoami")).await;
    assert_eq!(
        response.text(),
        Some("I don't know who you are. :crying_cat_face:")
    );

    bot.deps()
        .users
        .add_user("U1", "alice", None)
        .await
        .expect("user stored");

    let response = bot.handle(text("U1", "whoami")).await;
    let reply = response.text().expect("text reply");
    assert!(reply.contains("alice"));
    assert!(reply.contains("(unverified)"));
}

#[tokio::test]
async fn test_empty_text_runs_default_command() {
    let response = bot(Fixtures::default()).handle(text("U1", "")).await;
    assert_eq!(
        response,
        Response::from("There are no open tournaments. Is it time to start one? :thinking_face:")
    );

    let response = bot(demo()).handle(text("U1", "   ")).await;
    let template = response.as_template().expect("tournament list");
    assert_eq!(
        template.text.as_deref(),
        Some("*:trophy: Open tournaments: :trophy:*")
    );
    assert_eq!(template.attachments.len(), 3);
}

#[tokio::test]
async fn test_configured_default_command() {
    let config = BotConfig {
        default_command: "whoami".to_string(),
    };
    let bot = Bot::new(&config, Deps::in_memory(demo())).expect("valid configuration");
    let response = bot.handle(text(ALICE, "")).await;
    assert_eq!(
        response.text(),
        Some("You are known as *alice* (verified). :ok_hand:")
    );
}

#[rstest]
#[case("dance")]
#[case("dance with me")]
#[case("WHOAMI")]
#[tokio::test]
async fn test_unknown_command_names_token(#[case] input: &str) {
    let response = bot(demo()).handle(text(ALICE, input)).await;
    let token = input.split_whitespace().next().expect("token");
    assert_eq!(
        response,
        Response::from(format!(
            ":trophy: `{token}` is not how you win a game... Try `/tournie help`."
        ))
    );
}

#[tokio::test]
async fn test_unknown_callback_goes_through_generic_error_path() {
    let message = Message::callback(ALICE, "bogus-1", vec![Action::button("x", "y")]);
    let response = bot(demo()).handle(message).await;
    assert_eq!(response, apology("Missing handler for callback: bogus-1"));
}

#[tokio::test]
async fn test_callback_wins_over_text() {
    let mut message = Message::callback(ALICE, "usage", vec![Action::button("close", "close")]);
    message.text = "whoami".to_string();
    let response = bot(demo()).handle(message).await;
    assert_eq!(response, Response::from(Template::delete_original()));
}

#[tokio::test]
async fn test_sign_up_from_list() {
    let bot = bot(demo());
    let message = Message::callback(
        ALICE,
        "tournament-3003",
        vec![Action::button("sign_up", "3003")],
    );
    let response = bot.handle(message).await;
    assert_eq!(
        response,
        Response::from(
            Template::with_text(
                "Awesome! You are now signed up for tournament *Foosball Open.* :tada:"
            )
            .replace_original(false)
        )
    );

    let response = bot.handle(text(ALICE, "signup")).await;
    assert_eq!(
        response,
        Response::from("There are currently no tournaments where you can sign up.")
    );
}

#[tokio::test]
async fn test_sign_up_without_value_names_callback() {
    let message = Message::callback(ALICE, "tournament-3003", vec![Action {
        name: "sign_up".to_string(),
        ..Action::default()
    }]);
    let response = bot(demo()).handle(message).await;
    assert_eq!(
        response,
        Response::from("Invalid action value(s) for callback: tournament-3003")
    );
}

#[tokio::test]
async fn test_sign_up_for_vanished_tournament() {
    let message = Message::callback(ALICE, "tournament-9", vec![Action::button("sign_up", "9")]);
    let response = bot(demo()).handle(message).await;
    assert_eq!(response, Response::from("Tournament not found: 9"));
}

#[tokio::test]
async fn test_upstream_error_is_apologised_for() {
    let message = Message::callback(
        ALICE,
        "tournament-3001",
        vec![Action::button("sign_up", "3001")],
    );
    let response = bot(demo()).handle(message).await;
    assert_eq!(
        response,
        apology(r#"422 – {"errors":["Participant has already been taken"]}"#)
    );
}

#[tokio::test]
async fn test_connect_and_disconnect_with_aliases() {
    let bot = bot(demo());

    let response = bot.handle(text("U2", "login bob")).await;
    assert_eq!(
        response.text(),
        Some("Congrats! You are now known as *bob* (verified). :tada:")
    );

    let response = bot.handle(text("U2", "connect carol")).await;
    assert_eq!(
        response.text(),
        Some("You are already logged in as *bob* (verified). :angry:")
    );

    let response = bot.handle(text("U2", "logout")).await;
    assert_eq!(
        response,
        Response::from("Okay, you are now forgotten. I hope to see you later! :wave:")
    );

    let response = bot.handle(text("U2", "whoami")).await;
    assert_eq!(
        response.text(),
        Some("I don't know who you are. :crying_cat_face:")
    );
}

#[tokio::test]
async fn test_login_menu_callback() {
    let bot = bot(demo());
    let message = Message::callback("U3", "login", vec![Action::selection("username", &["erin"])]);
    let response = bot.handle(message).await;
    let text = response.as_template().expect("template").attachments[0]
        .text
        .clone()
        .unwrap_or_default();
    assert!(text.ends_with("Congrats! You are now known as *erin* (verified). :tada:"));
}

#[tokio::test]
async fn test_next_and_report() {
    let bot = bot(demo());

    let response = bot.handle(text(ALICE, "next")).await;
    let template = response.as_template().expect("match list");
    assert_eq!(template.attachments.len(), 2);

    let response = bot.handle(text(ALICE, "report 11-4 11-6")).await;
    assert_eq!(
        response.text(),
        Some("Reported scores on *alice* (you) vs *carol* (Klask League): 11-4, 11-6")
    );

    let response = bot.handle(text(ALICE, "next")).await;
    let template = response.as_template().expect("match list");
    assert_eq!(template.attachments.len(), 1);
}

#[tokio::test]
async fn test_help_and_close() {
    let bot = bot(demo());
    let response = bot.handle(text(ALICE, "usage")).await;
    let attachment = &response.as_template().expect("help").attachments[0];
    let help = attachment.text.as_deref().unwrap_or_default();
    assert!(help.starts_with(
        "*Supported commands:*\n• `/tournie [tournaments]` to list open tournaments"
    ));
    assert!(help.contains(
        "• `/tournie connect [<challonge_username>]` to connect your Slack and Challonge accounts"
    ));

    let close = Message::callback(ALICE, "usage", vec![Action::button("close", "close")]);
    let response = bot.handle(close).await;
    assert_eq!(response.to_json(), r#"{"delete_original":true}"#);
}

#[tokio::test]
async fn test_debug_flag_returns_json() {
    let response = bot(Fixtures::default()).handle(text("U1", "whoami --debug")).await;
    assert_eq!(
        response,
        Response::from(
            r#"{"text":"I don't know who you are. :crying_cat_face:","replace_original":false}"#
        )
    );
}

#[tokio::test]
async fn test_debug_flag_is_not_a_score() {
    let bot = bot(demo());
    let response = bot.handle(text(ALICE, "report 11-4 11-6 --debug")).await;
    let reported = Response::from(
        "Reported scores on *alice* (you) vs *carol* (Klask League): 11-4, 11-6",
    );
    assert_eq!(response, Response::from(reported.to_json()));

    let response = bot.handle(text(ALICE, "next")).await;
    assert_eq!(response.as_template().expect("match list").attachments.len(), 1);
}

#[tokio::test]
async fn test_debug_flag_is_not_a_username() {
    let bot = bot(demo());
    let response = bot.handle(text("U2", "connect --debug")).await;
    let json = response.text().expect("json text");
    let menu: serde_json::Value = serde_json::from_str(json).expect("valid json");
    assert_eq!(menu["attachments"][0]["callback_id"], "login");
    assert_eq!(menu["attachments"][0]["actions"][0]["name"], "username");

    let stored = bot.deps().users.get_user("U2").await.expect("lookup succeeds");
    assert_eq!(stored, None);
}

#[tokio::test]
async fn test_report_menu_choice() {
    let bot = bot(demo());
    let choice = Message::callback(
        ALICE,
        "report",
        vec![Action::selection("report_scores", &["501"])],
    );
    let response = bot.handle(choice).await;
    let attachment = &response.as_template().expect("followup").attachments[0];
    assert_eq!(
        attachment.text.as_deref(),
        Some(
            "Report the set scores of *alice* (you) vs *carol* (Klask League) \
             like `report 501 11-7 9-11 11-5`. :memo:"
        )
    );

    let response = bot.handle(text(ALICE, "report 501 11-4 11-6")).await;
    assert_eq!(
        response.text(),
        Some("Reported scores on *alice* (you) vs *carol* (Klask League): 11-4, 11-6")
    );
}
