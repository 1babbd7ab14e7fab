//! Single binary web server: round engine behind a REST API with cookie sessions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT (see `ServerConfig`).

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use carrom_tournament_web::{
    CompetitorId, EditOverride, ErrorResponse, MatchId, MatchInput, RequestContext, ServerConfig,
    TournamentError, TournamentId, TournamentRoundEngine, TournamentSettings, TransitionOutcome,
    TransitionResponse,
};
use serde::{Deserialize, Serialize};

/// Engine (all tournaments, one lock each) plus configuration.
struct AppData {
    engine: TournamentRoundEngine,
    config: ServerConfig,
}

type AppState = Data<AppData>;

/// Session key holding the signed-in user name.
const USER_KEY: &str = "user";

fn override_key(id: TournamentId) -> String {
    format!("edit_override:{}", id)
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct SignInBody {
    user: String,
}

#[derive(Deserialize)]
struct AddCompetitorBody {
    name: String,
}

#[derive(Deserialize)]
struct DeleteFromTurnBody {
    #[serde(rename = "fromTurn", alias = "from_turn")]
    from_turn: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OverrideResponse {
    success: bool,
    edit_override: EditOverride,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and competitor id
#[derive(Deserialize)]
struct CompetitorPath {
    id: TournamentId,
    competitor_id: CompetitorId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct TurnPath {
    id: TournamentId,
    turn: u32,
}

#[derive(Deserialize)]
struct BoardPath {
    id: TournamentId,
    turn: u32,
    board: u32,
}

/// Caller identity and edit override for one tournament, from the session cookie.
fn request_context(session: &Session, state: &AppData, id: Option<TournamentId>) -> RequestContext {
    let actor = session.get::<String>(USER_KEY).ok().flatten();
    let is_admin = actor.as_deref().map_or(false, |u| state.config.is_admin(u));
    let edit_override = id.and_then(|id| {
        session
            .get::<EditOverride>(&override_key(id))
            .ok()
            .flatten()
    });
    RequestContext {
        actor,
        is_admin,
        edit_override,
    }
}

/// Forget the session's override once the engine has voided it.
fn sync_override(session: &Session, id: TournamentId, ctx: &RequestContext) {
    if ctx.edit_override.is_none() {
        session.remove(&override_key(id));
    }
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = ErrorResponse::from(e);
    match e {
        TournamentError::Unauthorized => HttpResponse::Forbidden().json(body),
        TournamentError::CommunicationError(_) => HttpResponse::BadGateway().json(body),
        e if e.is_not_found() => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

fn transition_response(result: Result<TransitionOutcome, TournamentError>) -> HttpResponse {
    match result {
        Ok(outcome) => HttpResponse::Ok().json(TransitionResponse::from(outcome)),
        Err(e) => error_response(&e),
    }
}

fn session_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        success: false,
        message: "session error".to_string(),
    })
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "carrom-tournament-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Sign in: remember the user name in the session cookie.
#[post("/api/session")]
async fn api_sign_in(session: Session, body: Json<SignInBody>) -> HttpResponse {
    let user = body.user.trim();
    if user.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            success: false,
            message: "User name must not be empty".to_string(),
        });
    }
    session.renew();
    match session.insert(USER_KEY, user) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true, "user": user })),
        Err(_) => session_error(),
    }
}

#[delete("/api/session")]
async fn api_sign_out(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

/// Create a new tournament owned by the signed-in user.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    session: Session,
    body: Option<Json<TournamentSettings>>,
) -> HttpResponse {
    let ctx = request_context(&session, &state, None);
    let settings = body.map(Json::into_inner).unwrap_or_default();
    match state.engine.create_tournament(&ctx, settings) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

/// Get a tournament by id (404 if not found).
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.engine.tournament(path.id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

/// Which round actions the signed-in user may trigger right now.
#[get("/api/tournaments/{id}/actions")]
async fn api_available_actions(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let ctx = request_context(&session, &state, Some(path.id));
    match state.engine.available_actions(&ctx, path.id) {
        Ok(actions) => HttpResponse::Ok().json(actions),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/competitors")]
async fn api_add_competitor(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<AddCompetitorBody>,
) -> HttpResponse {
    let ctx = request_context(&session, &state, Some(path.id));
    match state.engine.add_competitor(&ctx, path.id, &body.name) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

/// Remove a competitor (only before the first round).
#[delete("/api/tournaments/{id}/competitors/{competitor_id}")]
async fn api_remove_competitor(state: AppState, session: Session, path: Path<CompetitorPath>) -> HttpResponse {
    let ctx = request_context(&session, &state, Some(path.id));
    match state.engine.remove_competitor(&ctx, path.id, path.competitor_id) {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

/// Open the next round.
#[post("/api/tournaments/{id}/new-turn")]
async fn api_new_turn(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let mut ctx = request_context(&session, &state, Some(path.id));
    let result = state.engine.new_turn(&mut ctx, path.id);
    sync_override(&session, path.id, &ctx);
    transition_response(result)
}

/// Open a final round.
#[post("/api/tournaments/{id}/final-turn")]
async fn api_final_turn(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let mut ctx = request_context(&session, &state, Some(path.id));
    let result = state.engine.final_turn(&mut ctx, path.id);
    sync_override(&session, path.id, &ctx);
    transition_response(result)
}

/// Delete a round and every later one.
#[post("/api/tournaments/{id}/delete-from-turn")]
async fn api_delete_from_turn(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<DeleteFromTurnBody>,
) -> HttpResponse {
    let mut ctx = request_context(&session, &state, Some(path.id));
    let result = state.engine.delete_from_turn(&mut ctx, path.id, body.from_turn);
    sync_override(&session, path.id, &ctx);
    transition_response(result)
}

/// Score the current round into standings.
#[post("/api/tournaments/{id}/update-ranking")]
async fn api_update_ranking(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let ctx = request_context(&session, &state, Some(path.id));
    transition_response(state.engine.update_ranking(&ctx, path.id))
}

#[get("/api/tournaments/{id}/ranking")]
async fn api_ranking(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.engine.standings(path.id) {
        Ok(standings) => HttpResponse::Ok().json(standings),
        Err(e) => error_response(&e),
    }
}

/// The operator confirmed editing earlier rounds; valid until the next round transition.
#[post("/api/tournaments/{id}/allow-edit-previous-turns")]
async fn api_allow_edit_previous_turns(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    let ctx = request_context(&session, &state, Some(path.id));
    let edit_override = match state.engine.allow_edit_previous_turns(&ctx, path.id) {
        Ok(o) => o,
        Err(e) => return error_response(&e),
    };
    match session.insert(override_key(path.id), edit_override) {
        Ok(()) => HttpResponse::Ok().json(OverrideResponse {
            success: true,
            edit_override,
        }),
        Err(_) => session_error(),
    }
}

/// Save a match result (bonus-coin boards, training boards, or direct scores).
#[put("/api/tournaments/{id}/matches/{match_id}")]
async fn api_save_match_results(
    state: AppState,
    session: Session,
    path: Path<MatchPath>,
    body: Json<MatchInput>,
) -> HttpResponse {
    let ctx = request_context(&session, &state, Some(path.id));
    transition_response(
        state
            .engine
            .save_match_results(&ctx, path.id, path.match_id, body.into_inner()),
    )
}

#[get("/api/tournaments/{id}/turns/{turn}/matches")]
async fn api_round_matches(state: AppState, path: Path<TurnPath>) -> HttpResponse {
    match state.engine.round_matches(path.id, path.turn) {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&e),
    }
}

/// Jump to a board of a round.
#[get("/api/tournaments/{id}/turns/{turn}/boards/{board}")]
async fn api_match_at_board(state: AppState, path: Path<BoardPath>) -> HttpResponse {
    match state.engine.match_at_board(path.id, path.turn, path.board) {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/turns/{turn}/matches.csv")]
async fn api_round_csv(state: AppState, path: Path<TurnPath>) -> HttpResponse {
    match state.engine.export_round_csv(path.id, path.turn) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .body(csv),
        Err(e) => error_response(&e),
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(favicon)
        .service(api_sign_in)
        .service(api_sign_out)
        .service(api_create_tournament)
        .service(api_get_tournament)
        .service(api_available_actions)
        .service(api_add_competitor)
        .service(api_remove_competitor)
        .service(api_new_turn)
        .service(api_final_turn)
        .service(api_delete_from_turn)
        .service(api_update_ranking)
        .service(api_ranking)
        .service(api_allow_edit_previous_turns)
        .service(api_save_match_results)
        .service(api_round_csv)
        .service(api_round_matches)
        .service(api_match_at_board);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let key = match &config.session_key {
        Some(bytes) => Key::from(bytes.as_slice()),
        None => {
            log::warn!("No SESSION_KEY set; sessions will not survive a restart");
            Key::generate()
        }
    };
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    if !config.admins.is_empty() {
        log::info!("Admins: {}", config.admins.join(", "));
    }

    let state = Data::new(AppData {
        engine: TournamentRoundEngine::default(),
        config,
    });

    // Background task: periodically remove tournaments nobody touched for a while
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let timeout = state_cleanup.config.inactivity_timeout;
        let mut interval = tokio::time::interval(state_cleanup.config.cleanup_interval);
        loop {
            interval.tick().await;
            let removed = state_cleanup.engine.evict_idle(timeout);
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive tournament(s) (no activity for {}h)",
                    removed,
                    timeout.as_secs() / 3600
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{cookie::Cookie, http::StatusCode, test};
    use carrom_tournament_web::Tournament;

    fn app_data() -> AppState {
        Data::new(AppData {
            engine: TournamentRoundEngine::default(),
            config: ServerConfig::default(),
        })
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .wrap(
                        SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                            .cookie_secure(false)
                            .build(),
                    )
                    .configure(routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn anonymous_users_cannot_create_tournaments() {
        let state = app_data();
        let app = test_app!(state);
        let req = test::TestRequest::post().uri("/api/tournaments").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn unknown_tournament_is_404() {
        let state = app_data();
        let app = test_app!(state);
        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{}", uuid::Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn signed_in_owner_opens_a_round() {
        let state = app_data();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/session")
            .set_json(serde_json::json!({ "user": "alice" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie: Cookie<'static> = resp
            .response()
            .cookies()
            .next()
            .map(|c| c.into_owned())
            .expect("session cookie");

        let req = test::TestRequest::post()
            .uri("/api/tournaments")
            .cookie(cookie.clone())
            .set_json(serde_json::json!({ "name": "Club night" }))
            .to_request();
        let tournament: Tournament = test::call_and_read_body_json(&app, req).await;
        assert_eq!(tournament.owner, "alice");

        for name in ["Ann", "Bea", "Cid"] {
            let req = test::TestRequest::post()
                .uri(&format!("/api/tournaments/{}/competitors", tournament.id))
                .cookie(cookie.clone())
                .set_json(serde_json::json!({ "name": name }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{}/new-turn", tournament.id))
            .cookie(cookie.clone())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["currentTurn"], 1);
        assert_eq!(body["rankedTurn"], 0);
        assert_eq!(body["matches"].as_array().map(Vec::len), Some(2));

        let req = test::TestRequest::post()
            .uri(&format!("/api/tournaments/{}/new-turn", tournament.id))
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let req = test::TestRequest::get()
            .uri(&format!("/api/tournaments/{}/turns/1/matches.csv", tournament.id))
            .to_request();
        let csv = test::call_and_read_body(&app, req).await;
        let csv = String::from_utf8(csv.to_vec()).expect("utf-8");
        assert!(csv.starts_with("turn,board,competitor1,competitor2,score1,score2,final"));
        assert!(csv.contains("Phantom"));
    }
}
