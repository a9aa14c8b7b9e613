use super::*;
use crate::test_support::{
    listing_session, place, test_settings, Action, ActionKind, FakeSession,
    Fixture, LISTING_URL,
};

const ID: &str = "12345";

#[tokio::test]
async fn opens_the_form_through_the_identifier_tier() {
    let (session, refs) = listing_session(ID, "-6.2", "106.8");

    let located = locate(&session, &test_settings(), &Diagnostics::disabled(), ID)
        .await
        .expect("locate");

    assert_eq!(
        located,
        Located::View(FocusedView {
            record_id: ID.to_string(),
            tier: LocateTier::IdentifierMatch,
        })
    );
    assert_eq!(session.current_page(), "form");

    let actions: Vec<Action> = session
        .actions()
        .into_iter()
        .filter(|a| !matches!(a, Action::Snapshot))
        .collect();
    assert_eq!(
        actions,
        vec![
            Action::Navigate(LISTING_URL.to_string()),
            Action::Click(refs.menu),
            Action::Click(refs.filter_toggle),
            Action::Fill(refs.id_input, ID.to_string()),
            Action::Click(refs.filter_toggle),
            Action::Click(refs.result_card),
        ]
    );
}

#[tokio::test]
async fn missing_menu_is_not_found() {
    let mut fx = Fixture::new(LISTING_URL);
    fx.add(Fixture::BODY, "p", |n| n.text = "Beranda".into());
    let session = FakeSession::new(fx.build());

    let located = locate(&session, &test_settings(), &Diagnostics::disabled(), ID)
        .await
        .expect("locate");

    assert_eq!(located, Located::NotFound(NotFoundReason::MenuMissing));
    assert_eq!(
        located_reason(&located),
        Some("ground check menu not found".to_string())
    );
}

#[tokio::test]
async fn missing_identifier_input_is_terminal() {
    let mut listing = Fixture::new(LISTING_URL);
    let menu = listing.add(Fixture::BODY, "a", |n| n.text = "Ground Check Direktori".into());
    let mut search = Fixture::new(LISTING_URL);
    search.add(Fixture::BODY, "div", |n| {
        n.class_name = "card".into();
        n.text = format!("IDSBR {ID} Toko Sumber Rejeki");
        place(n, 0.0, 200.0, 600.0, 80.0);
    });
    let session = FakeSession::new(listing.build())
        .with_page("search", search.build())
        .on_click("start", menu, "search");

    let located = locate(&session, &test_settings(), &Diagnostics::disabled(), ID)
        .await
        .expect("locate");

    assert_eq!(
        located,
        Located::NotFound(NotFoundReason::IdentifierInputMissing)
    );
    assert_eq!(session.count(|a| matches!(a, Action::Fill(..))), 0);
}

#[tokio::test]
async fn search_without_filter_toggle_skips_the_toggle_clicks() {
    let mut listing = Fixture::new(LISTING_URL);
    let menu = listing.add(Fixture::BODY, "a", |n| n.text = "Ground Check Direktori".into());
    let mut search = Fixture::new(LISTING_URL);
    let input = search.add(Fixture::BODY, "input", |n| {
        n.input_type = Some("number".into());
        place(n, 0.0, 0.0, 200.0, 30.0);
    });
    let row = search.add(Fixture::BODY, "a", |n| n.text = format!("{ID} Warung Bu Tini"));
    let session = FakeSession::new(listing.build())
        .with_page("search", search.build())
        .on_click("start", menu, "search");

    let located = locate(&session, &test_settings(), &Diagnostics::disabled(), ID)
        .await
        .expect("locate");

    assert!(matches!(located, Located::View(_)));
    let clicks: Vec<Action> = session
        .actions()
        .into_iter()
        .filter(|a| matches!(a, Action::Click(_) | Action::Fill(..)))
        .collect();
    assert_eq!(
        clicks,
        vec![
            Action::Click(menu),
            Action::Fill(input, ID.to_string()),
            Action::Click(row),
        ]
    );
}

#[tokio::test]
async fn blind_pointer_click_counts_as_located() {
    let mut listing = Fixture::new(LISTING_URL);
    let menu = listing.add(Fixture::BODY, "a", |n| n.text = "Ground Check Direktori".into());
    let mut search = Fixture::new(LISTING_URL);
    search.add(Fixture::BODY, "input", |n| {
        n.input_type = Some("text".into());
        n.placeholder = "IDSBR".into();
    });
    let session = FakeSession::new(listing.build())
        .with_page("search", search.build())
        .on_click("start", menu, "search");

    let located = locate(&session, &test_settings(), &Diagnostics::disabled(), ID)
        .await
        .expect("locate");

    assert_eq!(
        located,
        Located::View(FocusedView {
            record_id: ID.to_string(),
            tier: LocateTier::PointerFallback,
        })
    );
    assert!(session.actions().contains(&Action::ClickAt(768.0, 320.0)));
}

#[tokio::test]
async fn undispatched_pointer_click_is_not_found() {
    let mut listing = Fixture::new(LISTING_URL);
    let menu = listing.add(Fixture::BODY, "a", |n| n.text = "Ground Check Direktori".into());
    let mut search = Fixture::new(LISTING_URL);
    search.add(Fixture::BODY, "input", |n| {
        n.input_type = Some("text".into());
        n.placeholder = "IDSBR".into();
    });
    let tmp = tempfile::tempdir().expect("temp dir");
    let dir = tmp.path().to_path_buf();
    let session = FakeSession::new(listing.build())
        .with_page("search", search.build())
        .on_click("start", menu, "search")
        .failing(ActionKind::ClickAt);

    let located = locate(
        &session,
        &test_settings(),
        &Diagnostics::new(Some(dir.clone())),
        ID,
    )
    .await
    .expect("locate");

    assert_eq!(
        located_reason(&located),
        Some(format!("search result not found for identifier {ID}"))
    );
    assert!(dir.join(format!("failed-no-result-{ID}.png")).exists());
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn navigation_fault_propagates() {
    let (session, _) = listing_session(ID, "-6.2", "106.8");
    let session = session.failing(ActionKind::Navigate);

    let result = locate(&session, &test_settings(), &Diagnostics::disabled(), ID).await;

    assert!(matches!(result, Err(SessionError::Script(_))));
}

fn located_reason(located: &Located) -> Option<String> {
    match located {
        Located::NotFound(reason) => Some(reason.to_string()),
        Located::View(_) => None,
    }
}
