use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::routes::create_api_router;
use crate::tests::support::test_state;

#[tokio::test]
async fn health_endpoint_reports_both_stores_reachable() {
    let (state, _) = test_state();
    let app = create_api_router(state.clone()).with_state(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
