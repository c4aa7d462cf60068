/*!
 * Record Workflow Integration Tests
 *
 * Drives the list / create / detail / update / delete pages over HTTP for
 * every record type, the way a browser would: form posts, session cookies
 * and redirects.
 *
 * Test Categories:
 * - Login wall (redirects for anonymous visitors)
 * - Create and list (owner assignment, flash messages)
 * - Validation failures (no persistence, errors re-rendered)
 * - To-do privacy (other accounts get 404)
 * - Update and delete (redirect targets, repeated delete)
 */

mod common;

use axum::http::StatusCode;
use common::*;
use ggfm_records::commercials::Commercial;
use ggfm_records::finances::FinancialTransaction;
use ggfm_records::programmes::Programme;
use ggfm_records::store;
use ggfm_records::todos::TodoItem;

const PROGRAMME_FORM: &str = "title=Morning+Show&description=Wake+up+with+GGFM\
    &start_time=2030-05-01T07%3A00&end_time=2030-05-01T09%3A00&location=Studio+A&host=Kim";

#[tokio::test]
async fn anonymous_visitor_is_redirected_to_login() {
    let (app, _db, _temp_dir) = setup_test_app().await;

    for path in [
        "/ggfm/dashboard/",
        "/ggfm/programmes/",
        "/ggfm/finances/add/",
        "/ggfm/todo/1/",
        "/ggfm/commercials/1/edit/",
    ] {
        let response = get(&app, path, None).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{}", path);
        assert_eq!(location(&response), "/ggfm/login/", "{}", path);
    }

    let response = post_form(&app, "/ggfm/programmes/add/", PROGRAMME_FORM, None).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/ggfm/login/");
}

#[tokio::test]
async fn home_page_is_public() {
    let (app, _db, _temp_dir) = setup_test_app().await;

    let response = get(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("/ggfm/login/"));
}

#[tokio::test]
async fn create_programme_sets_owner_and_appears_in_list() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;
    let alice = account_id(&db, "alice").await;

    let response = post_form(&app, "/ggfm/programmes/add/", PROGRAMME_FORM, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/ggfm/programmes/");

    let programmes = store::list::<Programme>(&db, alice).await.unwrap();
    assert_eq!(programmes.len(), 1);
    assert_eq!(programmes[0].meta.owner, Some(alice));
    assert_eq!(programmes[0].title, "Morning Show");
    assert_eq!(programmes[0].host.as_deref(), Some("Kim"));

    let page = body_text(get(&app, "/ggfm/programmes/", Some(&cookie)).await).await;
    assert!(page.contains("Morning Show"));
    assert!(page.contains("Programme added successfully!"));
}

#[tokio::test]
async fn create_form_renders_for_each_entity() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;

    for (path, title) in [
        ("/ggfm/programmes/add/", "Add New Programme"),
        ("/ggfm/finances/add/", "Add New Financial Transaction"),
        ("/ggfm/todo/add/", "Add New To-Do Item"),
        ("/ggfm/commercials/add/", "Add New Commercial"),
    ] {
        let response = get(&app, path, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
        assert!(body_text(response).await.contains(title), "{}", path);
    }
}

#[tokio::test]
async fn todo_form_starts_at_medium_priority() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;

    let page = body_text(get(&app, "/ggfm/todo/add/", Some(&cookie)).await).await;
    assert!(page.contains(r#"<option value="medium" selected>Medium</option>"#));
}

#[tokio::test]
async fn invalid_transaction_is_not_saved() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;
    let alice = account_id(&db, "alice").await;

    let response = post_form(
        &app,
        "/ggfm/finances/add/",
        "date=&type=income&category=donations&amount=lots",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_text(response).await;
    assert!(page.contains("date: This field is required."));
    assert!(page.contains("amount: Enter a number."));
    // submitted values are kept for correction
    assert!(page.contains(r#"value="lots""#));

    let transactions = store::list::<FinancialTransaction>(&db, alice).await.unwrap();
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn transaction_records_the_actor() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "treasurer").await;
    let treasurer = account_id(&db, "treasurer").await;

    let response = post_form(
        &app,
        "/ggfm/finances/add/",
        "date=2024-01-01&type=income&category=donations&amount=100.00&description=Pledge+drive",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/ggfm/finances/");

    let transactions = store::list::<FinancialTransaction>(&db, treasurer).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].meta.owner, Some(treasurer));
    assert_eq!(transactions[0].amount.to_string(), "100.00");
}

#[tokio::test]
async fn todo_items_are_private_to_their_creator() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let alice_cookie = register(&app, "alice").await;
    let bob_cookie = register(&app, "bob").await;
    let alice = account_id(&db, "alice").await;

    let response = post_form(
        &app,
        "/ggfm/todo/add/",
        "task=Renew+licence&priority=high&due_date=2030-01-31",
        Some(&alice_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let items = store::list::<TodoItem>(&db, alice).await.unwrap();
    assert_eq!(items.len(), 1);
    let id = items[0].meta.id;

    let detail = format!("/ggfm/todo/{}/", id);
    let edit = format!("/ggfm/todo/{}/edit/", id);
    let delete = format!("/ggfm/todo/{}/delete/", id);

    assert_eq!(get(&app, &detail, Some(&bob_cookie)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(&app, &edit, Some(&bob_cookie)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        post_form(&app, &edit, "task=Hijacked&priority=low", Some(&bob_cookie))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(get(&app, &delete, Some(&bob_cookie)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        post_form(&app, &delete, "", Some(&bob_cookie)).await.status(),
        StatusCode::NOT_FOUND
    );

    let bob_list = body_text(get(&app, "/ggfm/todo/", Some(&bob_cookie)).await).await;
    assert!(!bob_list.contains("Renew licence"));

    let alice_detail = get(&app, &detail, Some(&alice_cookie)).await;
    assert_eq!(alice_detail.status(), StatusCode::OK);
    assert!(body_text(alice_detail).await.contains("Renew licence"));

    let unchanged = store::find::<TodoItem>(&db, id, alice).await.unwrap();
    assert_eq!(unchanged.task, "Renew licence");
}

#[tokio::test]
async fn update_replaces_fields_and_redirects_to_detail() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;
    let alice = account_id(&db, "alice").await;

    post_form(&app, "/ggfm/programmes/add/", PROGRAMME_FORM, Some(&cookie)).await;
    let id = store::list::<Programme>(&db, alice).await.unwrap()[0].meta.id;
    let edit = format!("/ggfm/programmes/{}/edit/", id);

    let form_page = body_text(get(&app, &edit, Some(&cookie)).await).await;
    assert!(form_page.contains("Update Programme"));
    assert!(form_page.contains(r#"value="2030-05-01T07:00""#));

    let response = post_form(
        &app,
        &edit,
        "title=Evening+Show&start_time=2030-05-01+18%3A00",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/ggfm/programmes/{}/", id));

    let updated = store::find::<Programme>(&db, id, alice).await.unwrap();
    assert_eq!(updated.title, "Evening Show");
    // full replacement: omitted optional fields are cleared
    assert_eq!(updated.host, None);
    assert_eq!(updated.end_time, None);
    assert_eq!(updated.meta.owner, Some(alice));

    let detail = body_text(get(&app, &format!("/ggfm/programmes/{}/", id), Some(&cookie)).await).await;
    assert!(detail.contains("Programme updated successfully!"));
}

#[tokio::test]
async fn invalid_update_keeps_the_stored_record() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;
    let alice = account_id(&db, "alice").await;

    post_form(
        &app,
        "/ggfm/commercials/add/",
        "title=Spring+Sale&advertiser=Corner+Shop&duration_seconds=30&cost=120.50",
        Some(&cookie),
    )
    .await;
    let id = store::list::<Commercial>(&db, alice).await.unwrap()[0].meta.id;

    let response = post_form(
        &app,
        &format!("/ggfm/commercials/{}/edit/", id),
        "title=Spring+Sale&advertiser=Corner+Shop&duration_seconds=half+a+minute",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("duration_seconds: Enter a whole number."));

    let stored = store::find::<Commercial>(&db, id, alice).await.unwrap();
    assert_eq!(stored.duration_seconds, 30);
    assert_eq!(stored.cost.map(|c| c.to_string()).as_deref(), Some("120.50"));
}

#[tokio::test]
async fn delete_confirms_then_removes_once() {
    let (app, db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;
    let alice = account_id(&db, "alice").await;

    post_form(
        &app,
        "/ggfm/commercials/add/",
        "title=Jingle&advertiser=Bakery&duration_seconds=15",
        Some(&cookie),
    )
    .await;
    let id = store::list::<Commercial>(&db, alice).await.unwrap()[0].meta.id;
    let delete = format!("/ggfm/commercials/{}/delete/", id);

    let confirm = get(&app, &delete, Some(&cookie)).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(body_text(confirm).await.contains("Jingle by Bakery (15s)"));

    let first = post_form(&app, &delete, "", Some(&cookie)).await;
    assert_eq!(first.status(), StatusCode::FOUND);
    assert_eq!(location(&first), "/ggfm/commercials/");

    let second = post_form(&app, &delete, "", Some(&cookie)).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    assert!(store::list::<Commercial>(&db, alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;

    for path in [
        "/ggfm/programmes/999/",
        "/ggfm/finances/999/edit/",
        "/ggfm/commercials/999/delete/",
    ] {
        assert_eq!(
            get(&app, path, Some(&cookie)).await.status(),
            StatusCode::NOT_FOUND,
            "{}",
            path
        );
    }
}

#[tokio::test]
async fn write_routes_reject_other_methods() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;

    let response = post_form(&app, "/ggfm/programmes/", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn dashboard_shows_financial_summary() {
    let (app, _db, _temp_dir) = setup_test_app().await;
    let cookie = register(&app, "alice").await;

    post_form(
        &app,
        "/ggfm/finances/add/",
        "date=2024-01-01&type=income&category=donations&amount=100.00",
        Some(&cookie),
    )
    .await;
    post_form(
        &app,
        "/ggfm/finances/add/",
        "date=2024-01-02&type=expense&category=rent_facilities&amount=40.00",
        Some(&cookie),
    )
    .await;

    let response = get(&app, "/ggfm/dashboard/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("<dt>Total Income</dt><dd>$100.00</dd>"));
    assert!(page.contains("<dt>Total Expense</dt><dd>$40.00</dd>"));
    assert!(page.contains("<dt>Net Balance</dt><dd>$60.00</dd>"));
}
