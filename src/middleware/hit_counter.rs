/// Counts every request that passes through the wrapped service.
/// Used on the static file scope.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use std::future::{ready, Ready};

use crate::metrics::ServerMetrics;

pub struct HitCounter {
    metrics: web::Data<ServerMetrics>,
}

impl HitCounter {
    pub fn new(metrics: web::Data<ServerMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HitCounterService {
            service,
            metrics: self.metrics.clone(),
        }))
    }
}

pub struct HitCounterService<S> {
    service: S,
    metrics: web::Data<ServerMetrics>,
}

impl<S, B> Service<ServiceRequest> for HitCounterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        self.metrics.record_hit();
        self.service.call(req)
    }
}
