//! Signup flow tests: the concrete steps against a fixture platform,
//! end to end through the controller.

mod common;

use crossterm::event::KeyCode;
use serde_json::json;

use arcus_console::components::PlaceSelector;
use arcus_console::wizard::steps::{keys, signup_steps};
use arcus_console::wizard::{
    NextOutcome, ProgressRecorder, Stage, StageStatus, WizardController,
};

use common::{step_form, type_text, MockPlatform};

fn signup_wizard(platform: std::sync::Arc<MockPlatform>) -> WizardController {
    WizardController::new(signup_steps(), common::context(platform))
}

/// Queue the whole-platform happy path for a monitored signup
fn queue_happy_path(platform: &MockPlatform) {
    platform.respond(
        "place:LookupZipcode",
        json!({ "city": "Portland", "state": "OR" }),
    );
    platform.respond("place:ValidateAddress", json!({ "valid": true }));
    platform.respond(
        "promon:CheckAvailability",
        json!({ "availability": "FULL" }),
    );
    platform.respond(
        "person:GetSecurityQuestions",
        json!({ "questions": [
            { "id": "q-pet", "question": "What was your first pet's name?" },
            { "id": "q-street", "question": "What street did you grow up on?" },
            { "id": "q-city", "question": "What city were you born in?" },
        ]}),
    );
    platform.respond(
        "promon:GetSettings",
        json!({ "trial": false, "permitRequired": false }),
    );
    // UpdateServicePlan, UpdateBillingInfoCC, SetSecurityAnswers,
    // ChangePin, TestCall, and SignupTransition answer with the mock's
    // default empty success
}

async fn advance(wizard: &mut WizardController) -> NextOutcome {
    wizard.next().await
}

#[tokio::test]
async fn unrecognized_zip_surfaces_step_error() {
    let platform = MockPlatform::new();
    platform.respond_err("place:LookupZipcode", "zip.unrecognized", "unknown zipcode");

    let mut wizard = signup_wizard(platform);
    wizard.start().await;
    type_text(step_form(&mut wizard), "99999");

    assert_eq!(advance(&mut wizard).await, NextOutcome::Failed);
    assert_eq!(
        wizard.current().unwrap().stage(),
        Stage::Zipcode,
        "cursor must not move on failure"
    );
    let error = wizard.current().unwrap().form_error().unwrap();
    assert!(error.contains("don't recognize"), "got: {error}");
    assert!(!wizard.progress().is_complete(Stage::Zipcode));
}

#[tokio::test]
async fn zipcode_refuses_short_input() {
    let platform = MockPlatform::new();
    let mut wizard = signup_wizard(platform.clone());
    wizard.start().await;
    type_text(step_form(&mut wizard), "972");

    assert_eq!(advance(&mut wizard).await, NextOutcome::NotSatisfied);
    // Refusal happens locally; nothing went to the platform
    assert!(platform.calls_of("place:LookupZipcode").is_empty());
}

#[tokio::test]
async fn monitored_signup_walks_all_eight_stages() {
    let platform = MockPlatform::new();
    queue_happy_path(&platform);

    let mut wizard = signup_wizard(platform.clone());
    wizard.start().await;

    // web:zipcode
    type_text(step_form(&mut wizard), "97210");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:address — city/state prefilled from the ZIP lookup
    assert_eq!(wizard.current().unwrap().stage(), Stage::Address);
    {
        let form = step_form(&mut wizard);
        assert_eq!(form.value("City"), "Portland");
        assert_eq!(form.value("State"), "OR");
        type_text(form, "1123 NW Quimby St");
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:plan — pick the monitored plan (last chooser item)
    assert_eq!(wizard.current().unwrap().stage(), Stage::Plan);
    {
        let form = step_form(&mut wizard);
        form.handle_key(KeyCode::Down);
        form.handle_key(KeyCode::Down);
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:billing
    assert_eq!(wizard.current().unwrap().stage(), Stage::Billing);
    {
        let form = step_form(&mut wizard);
        type_text(form, "Pat Doe");
        form.next_field();
        type_text(form, "4111111111111111");
        form.next_field();
        type_text(form, "04");
        form.next_field();
        type_text(form, "2027");
        form.next_field();
        type_text(form, "123");
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:security-questions — two distinct questions, answers, PIN
    assert_eq!(wizard.current().unwrap().stage(), Stage::SecurityQuestions);
    {
        let form = step_form(&mut wizard);
        form.next_field();
        type_text(form, "Rex");
        form.next_field();
        form.next_field();
        type_text(form, "Quimby");
        form.next_field();
        type_text(form, "4921");
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:promon.info — acknowledge
    assert_eq!(wizard.current().unwrap().stage(), Stage::PromonInfo);
    step_form(&mut wizard).handle_key(KeyCode::Char(' '));
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:promon.permit — no permit required, leave blank
    assert_eq!(wizard.current().unwrap().stage(), Stage::PromonPermit);
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // web:promon.test-call
    assert_eq!(wizard.current().unwrap().stage(), Stage::PromonTestCall);
    step_form(&mut wizard).handle_key(KeyCode::Char(' '));
    assert_eq!(advance(&mut wizard).await, NextOutcome::Complete);
    assert!(wizard.is_complete());

    // Every stage recorded, shared data readable by key
    for stage in [
        Stage::Zipcode,
        Stage::Address,
        Stage::Plan,
        Stage::Billing,
        Stage::SecurityQuestions,
        Stage::PromonInfo,
        Stage::PromonPermit,
        Stage::PromonTestCall,
    ] {
        assert!(wizard.progress().is_complete(stage), "{} missing", stage.key());
    }
    assert_eq!(wizard.progress().get_str(keys::PLAN), Some("PREMIUM_PROMON"));
    assert_eq!(wizard.progress().get_str(keys::BILLING_LAST4), Some("1111"));

    // The permit was blank, so no permit update went out
    assert!(platform.calls_of("promon:UpdatePermit").is_empty());
    assert_eq!(platform.calls_of("promon:TestCall").len(), 1);
    assert_eq!(platform.calls_of("account:SignupTransition").len(), 8);
}

#[tokio::test]
async fn basic_plan_bypasses_promon_stages() {
    let platform = MockPlatform::new();
    queue_happy_path(&platform);

    let mut wizard = signup_wizard(platform.clone());
    wizard.start().await;

    type_text(step_form(&mut wizard), "97210");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    type_text(step_form(&mut wizard), "1123 NW Quimby St");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    // Keep the default (Basic) plan
    assert_eq!(wizard.current().unwrap().stage(), Stage::Plan);
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    {
        let form = step_form(&mut wizard);
        type_text(form, "Pat Doe");
        form.next_field();
        type_text(form, "4111111111111111");
        form.next_field();
        type_text(form, "04");
        form.next_field();
        type_text(form, "2027");
        form.next_field();
        type_text(form, "123");
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    {
        let form = step_form(&mut wizard);
        form.next_field();
        type_text(form, "Rex");
        form.next_field();
        form.next_field();
        type_text(form, "Quimby");
        form.next_field();
        type_text(form, "4921");
    }
    // Security questions was the last applicable stage
    assert_eq!(advance(&mut wizard).await, NextOutcome::Complete);

    assert!(!wizard.progress().is_complete(Stage::PromonInfo));
    assert!(!wizard.progress().is_complete(Stage::PromonTestCall));
    assert!(platform.calls_of("promon:TestCall").is_empty());
}

#[tokio::test]
async fn unavailable_monitoring_disables_promon_plan() {
    let platform = MockPlatform::new();
    platform.respond(
        "promon:CheckAvailability",
        json!({ "availability": "NONE" }),
    );

    // Start the registry at the plan stage by pre-recording the earlier
    // stages the way a resumed session would see them
    let mut progress = ProgressRecorder::in_memory();
    progress
        .record_progress(
            Stage::Zipcode,
            [
                (keys::ZIPCODE.to_string(), json!("97210")),
                (keys::CITY.to_string(), json!("Portland")),
                (keys::STATE.to_string(), json!("OR")),
            ]
            .into_iter()
            .collect(),
        )
        .unwrap();
    progress
        .record_progress(
            Stage::Address,
            [(keys::ADDRESS_VALID.to_string(), json!(true))]
                .into_iter()
                .collect(),
        )
        .unwrap();

    let ctx = common::context_with_progress(platform.clone(), progress);
    let mut wizard = WizardController::new(signup_steps(), ctx);
    wizard.start().await;
    assert_eq!(wizard.current().unwrap().stage(), Stage::Plan);

    // Trying to reach the monitored plan stops at Premium
    {
        let form = step_form(&mut wizard);
        form.handle_key(KeyCode::Down);
        form.handle_key(KeyCode::Down);
        assert_eq!(form.field("Plan").unwrap().selected_index(), Some(1));
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    assert_eq!(wizard.progress().get_str(keys::PLAN), Some("PREMIUM"));
}

#[tokio::test]
async fn navigating_back_reopens_the_address_step() {
    let platform = MockPlatform::new();
    queue_happy_path(&platform);

    let mut wizard = signup_wizard(platform);
    wizard.start().await;

    type_text(step_form(&mut wizard), "97210");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    type_text(step_form(&mut wizard), "1123 NW Quimby St");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    assert_eq!(wizard.current().unwrap().stage(), Stage::Plan);

    wizard.prev().await;
    assert_eq!(wizard.current().unwrap().stage(), Stage::Address);
    // Address is retracted so it renders again; the ZIP stays recorded
    assert!(!wizard.progress().is_complete(Stage::Address));
    assert!(wizard.progress().is_complete(Stage::Zipcode));
    // Typed values survive the round trip
    assert_eq!(step_form(&mut wizard).value("Street address"), "1123 NW Quimby St");
}

#[tokio::test]
async fn duplicate_pin_keeps_security_step() {
    let platform = MockPlatform::new();
    queue_happy_path(&platform);
    platform.respond_err("person:ChangePin", "pin.notUniqueAtPlace", "pin in use");

    let mut wizard = signup_wizard(platform);
    wizard.start().await;

    type_text(step_form(&mut wizard), "97210");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    type_text(step_form(&mut wizard), "1123 NW Quimby St");
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    {
        let form = step_form(&mut wizard);
        type_text(form, "Pat Doe");
        form.next_field();
        type_text(form, "4111111111111111");
        form.next_field();
        type_text(form, "04");
        form.next_field();
        type_text(form, "2027");
        form.next_field();
        type_text(form, "123");
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);

    {
        let form = step_form(&mut wizard);
        form.next_field();
        type_text(form, "Rex");
        form.next_field();
        form.next_field();
        type_text(form, "Quimby");
        form.next_field();
        type_text(form, "1111");
    }
    assert_eq!(advance(&mut wizard).await, NextOutcome::Failed);
    assert_eq!(wizard.current().unwrap().stage(), Stage::SecurityQuestions);
    let error = wizard.current().unwrap().form_error().unwrap();
    assert!(error.contains("PIN"), "got: {error}");
}

#[tokio::test]
async fn persisted_progress_resumes_at_next_stage() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = ProgressRecorder::path_for(dir.path(), "person-1");

    // First session: complete the ZIP stage, then stop
    {
        let platform = MockPlatform::new();
        platform.respond(
            "place:LookupZipcode",
            json!({ "city": "Portland", "state": "OR" }),
        );
        let progress = ProgressRecorder::load(path.clone()).unwrap();
        let ctx = common::context_with_progress(platform, progress);
        let mut wizard = WizardController::new(signup_steps(), ctx);
        wizard.start().await;
        type_text(step_form(&mut wizard), "97210");
        assert_eq!(advance(&mut wizard).await, NextOutcome::Advanced);
    }

    // Second session: reloads the file and lands on the address stage
    let platform = MockPlatform::new();
    let progress = ProgressRecorder::load(path).unwrap();
    let ctx = common::context_with_progress(platform, progress);
    let mut wizard = WizardController::new(signup_steps(), ctx);
    wizard.start().await;
    assert_eq!(wizard.current().unwrap().stage(), Stage::Address);

    let overview = wizard.overview();
    assert_eq!(overview[0], (Stage::Zipcode, StageStatus::Done));
    assert_eq!(overview[1], (Stage::Address, StageStatus::Current));
}

#[tokio::test]
async fn available_places_render_sorted_case_insensitively() {
    let platform = MockPlatform::new();
    platform.respond(
        "sess:ListAvailablePlaces",
        json!({ "places": [
            { "placeId": "p-1", "name": "Main house", "role": "OWNER" },
            { "placeId": "p-2", "name": "downstairs", "role": "OTHER" },
            { "placeId": "p-3", "name": "Cabin", "role": "OWNER" },
        ]}),
    );

    let services = common::services(platform);
    let places = services.session().list_available_places().await.unwrap();
    assert_eq!(places.len(), 3);

    let mut selector = PlaceSelector::new();
    selector.set_places(places);
    assert_eq!(selector.places()[1].name, "downstairs");
    let names: Vec<&str> = selector.places().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Cabin", "downstairs", "Main house"]);
}
