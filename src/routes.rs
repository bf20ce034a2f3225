use crate::{
    api::{department, employee, session, timekeeping},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{Scope, middleware::from_fn, web};

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
/// `None` when the rate is zero.
pub fn build_limiter(requests_per_min: u32) -> Option<LimiterConfig> {
    if requests_per_min == 0 {
        return None;
    }

    GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
}

pub fn timekeeping_scope() -> Scope {
    web::scope("/timekeeping")
        // /timekeeping/scan
        .service(web::resource("/scan").route(web::post().to(session::scan)))
        // /timekeeping/session
        .service(
            web::resource("/session")
                .route(web::get().to(session::current_session))
                .route(web::delete().to(session::cancel_session)),
        )
        // /timekeeping/employee/{employee_id}
        .service(
            web::resource("/employee/{employee_id}").route(web::get().to(timekeeping::employee_records)),
        )
        // /timekeeping/department/{department_id}
        .service(
            web::resource("/department/{department_id}")
                .route(web::get().to(timekeeping::department_records)),
        )
        .service(
            web::resource("/department/{department_id}/summary")
                .route(web::get().to(timekeeping::department_summary)),
        )
        .service(
            web::resource("/department/{department_id}/summary/export")
                .route(web::get().to(timekeeping::export_department_summary)),
        )
}

pub fn employee_scope() -> Scope {
    web::scope("/employees")
        // /employees
        .service(
            web::resource("")
                .route(web::get().to(employee::list_employees))
                .route(web::post().to(employee::create_employee)),
        )
        // /employees/{employee_id}
        .service(
            web::resource("/{employee_id}")
                .route(web::get().to(employee::get_employee))
                .route(web::put().to(employee::update_employee))
                .route(web::delete().to(employee::delete_employee)),
        )
}

pub fn department_scope() -> Scope {
    web::scope("/departments").service(
        web::resource("/{department_id}").route(web::get().to(department::get_department)),
    )
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &LimiterConfig) {
    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .service(timekeeping_scope())
            .service(employee_scope())
            .service(department_scope()),
    );
}

// SCAN (device)
//  ├─ checkin  → attendance row + work session (elapsed refreshed every tick)
//  └─ checkout → check_out stamped, early leave flagged, session ended

// MANAGER
//  ├─ /department/{id}          records with derived status
//  ├─ /department/{id}/summary  work days / late days per employee
//  └─ /employees                roster of the manager's department (delete: Admin)
