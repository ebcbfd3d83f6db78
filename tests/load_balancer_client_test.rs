//! 负载均衡执行包装器测试
//!
//! 每次执行恰好通知一次观察者：无实例为 DISCARD，成功为 SUCCESS，失败为 FAILED

use std::any::TypeId;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use http::Uri;
use tokio_test::{assert_err, assert_ok};

use flare_loadbalancer_core::discovery::{ServiceInstance, SimpleDiscoveryClient};
use flare_loadbalancer_core::loadbalancer::{
    CompletionContext, CompletionStatus, DiscoverySource, LifecycleTypes, LoadBalancerClient,
    LoadBalancerFactory, LoadBalancerLifecycle, Request, Response, StatsLoadBalancerLifecycle,
    reconstruct_uri,
};
use flare_loadbalancer_core::{BoxError, ErrorCode, LoadBalancerError, LoadBalancerProperties};

/// 观察者收到的一次通知
#[derive(Debug, Clone)]
struct Recorded {
    status: CompletionStatus,
    service_id: String,
    instance_id: Option<String>,
    client_response: Option<String>,
    error: Option<String>,
}

/// 记录全部通知的观察者
#[derive(Default)]
struct RecordingLifecycle {
    started: Mutex<usize>,
    started_requests: Mutex<usize>,
    completions: Mutex<Vec<Recorded>>,
}

impl RecordingLifecycle {
    fn completions(&self) -> Vec<Recorded> {
        self.completions.lock().unwrap().clone()
    }
}

impl LoadBalancerLifecycle for RecordingLifecycle {
    fn on_start(&self, _request: &Request) {
        *self.started.lock().unwrap() += 1;
    }

    fn on_start_request(&self, _request: &Request, _response: &Response) {
        *self.started_requests.lock().unwrap() += 1;
    }

    fn on_complete(&self, completion: &CompletionContext<'_>) {
        self.completions.lock().unwrap().push(Recorded {
            status: completion.status,
            service_id: completion.service_id.to_string(),
            instance_id: completion
                .load_balancer_response
                .server()
                .map(|instance| instance.instance_id.clone()),
            client_response: completion
                .client_response_as::<&'static str>()
                .map(|s| s.to_string()),
            error: completion.error.map(|e| e.to_string()),
        });
    }
}

/// 只支持 `String` 响应的观察者，会在构造时被过滤掉
struct StringOnlyLifecycle;

impl LoadBalancerLifecycle for StringOnlyLifecycle {
    fn supports(&self, types: &LifecycleTypes) -> bool {
        types.client_response == TypeId::of::<String>()
    }

    fn on_complete(&self, _completion: &CompletionContext<'_>) {
        panic!("unsupported lifecycle must not be notified");
    }
}

fn create_factory() -> Arc<LoadBalancerFactory> {
    let discovery = SimpleDiscoveryClient::new()
        .with_instance(ServiceInstance::new("svc", "node-0", "10.0.0.1", 8080))
        .with_instance(ServiceInstance::new("svc", "node-1", "10.0.0.2", 8080));

    Arc::new(LoadBalancerFactory::new(
        LoadBalancerProperties::default(),
        DiscoverySource::Blocking(Arc::new(discovery)),
    ))
}

fn create_client() -> (LoadBalancerClient, Arc<RecordingLifecycle>) {
    let recorder = Arc::new(RecordingLifecycle::default());
    let client = LoadBalancerClient::new(create_factory(), vec![recorder.clone()]);
    (client, recorder)
}

async fn explode(_instance: ServiceInstance) -> Result<u32, BoxError> {
    panic!("request exploded")
}

/// 测试：未知服务不会调用请求函数，返回无可用实例错误并通知一次 DISCARD
#[tokio::test]
async fn test_execute_unknown_service_discards() {
    let (client, recorder) = create_client();
    let invoked = Arc::new(AtomicBool::new(false));
    let flag = invoked.clone();

    let result = client
        .execute("unknown", move |_instance| async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, BoxError>("ok")
        })
        .await;

    assert!(!invoked.load(Ordering::SeqCst));
    match result {
        Err(LoadBalancerError::NoInstancesAvailable { service_id }) => {
            assert_eq!(service_id, "unknown")
        }
        other => panic!("expected NoInstancesAvailable, got {:?}", other.map(|_| ())),
    }

    let completions = recorder.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].status, CompletionStatus::Discard);
    assert_eq!(completions[0].service_id, "unknown");
    assert!(completions[0].instance_id.is_none());
    assert_eq!(*recorder.started.lock().unwrap(), 1);
    assert_eq!(*recorder.started_requests.lock().unwrap(), 0);
}

/// 测试：请求成功时返回结果并通知一次 SUCCESS，携带客户端响应
#[tokio::test]
async fn test_execute_success() {
    let (client, recorder) = create_client();

    let result = client
        .execute("svc", |instance| async move {
            assert_eq!(instance.service_id, "svc");
            Ok::<_, BoxError>("ok")
        })
        .await;

    assert_eq!(assert_ok!(result), "ok");

    let completions = recorder.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].status, CompletionStatus::Success);
    assert_eq!(completions[0].instance_id.as_deref(), Some("node-0"));
    assert_eq!(completions[0].client_response.as_deref(), Some("ok"));
    assert!(completions[0].error.is_none());
    assert_eq!(*recorder.started_requests.lock().unwrap(), 1);
}

/// 测试：IO 错误原样透传，并通知一次 FAILED
#[tokio::test]
async fn test_execute_io_error_propagates() {
    let (client, recorder) = create_client();

    let result: flare_loadbalancer_core::Result<u32> = client
        .execute("svc", |_instance| async move {
            Err(Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")) as BoxError)
        })
        .await;

    let err = assert_err!(result);
    assert_eq!(err.code(), ErrorCode::RequestIo);
    assert_eq!(
        err.as_io().map(|e| e.kind()),
        Some(io::ErrorKind::ConnectionRefused)
    );

    let completions = recorder.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].status, CompletionStatus::Failed);
    assert_eq!(completions[0].error.as_deref(), Some("refused"));
}

/// 测试：非 IO 错误包装为请求错误，同样通知 FAILED
#[tokio::test]
async fn test_execute_other_error_wrapped() {
    let (client, recorder) = create_client();

    let result: flare_loadbalancer_core::Result<u32> = client
        .execute("svc", |_instance| async move { Err(BoxError::from("bad status 503")) })
        .await;

    let err = assert_err!(result);
    assert!(matches!(err, LoadBalancerError::Request(_)));
    assert_eq!(err.to_string(), "request failed: bad status 503");

    let completions = recorder.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].status, CompletionStatus::Failed);
}

/// 测试：请求函数 panic 时通知 FAILED，然后继续向上传播 panic
#[tokio::test]
async fn test_execute_panic_reports_failed() {
    let (client, recorder) = create_client();
    let client = Arc::new(client);

    let task = tokio::spawn({
        let client = client.clone();
        async move { client.execute("svc", explode).await }
    });

    let join_error = task.await.unwrap_err();
    assert!(join_error.is_panic());

    let completions = recorder.completions();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].status, CompletionStatus::Failed);
}

/// 测试：连续执行按轮询依次落在不同实例上
#[tokio::test]
async fn test_execute_rotates_instances() {
    let (client, _recorder) = create_client();

    let mut chosen = Vec::new();
    for _ in 0..4 {
        let id = client
            .execute("svc", |instance| async move { Ok::<_, BoxError>(instance.instance_id) })
            .await
            .unwrap();
        chosen.push(id);
    }

    assert_eq!(chosen, vec!["node-0", "node-1", "node-0", "node-1"]);
}

/// 测试：不支持当前类型组合的观察者在构造时被过滤
#[tokio::test]
async fn test_lifecycle_filtered_by_types() {
    let recorder = Arc::new(RecordingLifecycle::default());
    let client = LoadBalancerClient::new(
        create_factory(),
        vec![Arc::new(StringOnlyLifecycle), recorder.clone()],
    );

    assert_eq!(client.lifecycle_count(), 1);

    client
        .execute("svc", |_instance| async move { Ok::<_, BoxError>("ok") })
        .await
        .unwrap();
    assert_eq!(recorder.completions().len(), 1);
}

/// 测试：在未选中实例上执行等同于无可用实例
#[tokio::test]
async fn test_execute_on_without_instance() {
    let (client, recorder) = create_client();

    let result = client
        .execute_on("svc", None, Request::default(), |_instance| async move {
            Ok::<_, BoxError>("ok")
        })
        .await;

    assert!(matches!(result, Err(LoadBalancerError::NoInstancesAvailable { .. })));
    assert_eq!(recorder.completions()[0].status, CompletionStatus::Discard);
}

/// 测试：在指定实例上执行，不经过选择
#[tokio::test]
async fn test_execute_on_given_instance() {
    let (client, recorder) = create_client();
    let instance = ServiceInstance::new("svc", "pinned", "10.0.0.9", 9000);

    let host = client
        .execute_on("svc", Some(instance), Request::default(), |instance| async move {
            Ok::<_, BoxError>(instance.host)
        })
        .await
        .unwrap();

    assert_eq!(host, "10.0.0.9");
    assert_eq!(recorder.completions()[0].instance_id.as_deref(), Some("pinned"));
}

/// 测试：统计观察者按服务累计各状态次数
#[tokio::test]
async fn test_stats_lifecycle() {
    let stats = StatsLoadBalancerLifecycle::new();
    let client = LoadBalancerClient::new(create_factory(), vec![Arc::new(stats.clone())]);

    client
        .execute("svc", |_instance| async move { Ok::<_, BoxError>(1u32) })
        .await
        .unwrap();
    let _ = client
        .execute("svc", |_instance| async move { Err::<u32, _>(BoxError::from("boom")) })
        .await;
    let _ = client
        .execute("missing", |_instance| async move { Ok::<_, BoxError>(1u32) })
        .await;

    let svc = stats.get_stats("svc");
    assert_eq!(svc.requests_total, 2);
    assert_eq!(svc.requests_success, 1);
    assert_eq!(svc.requests_failed, 1);
    assert_eq!(svc.request_duration_ms.len(), 2);

    let missing = stats.get_stats("missing");
    assert_eq!(missing.requests_total, 1);
    assert_eq!(missing.requests_discarded, 1);
    assert!(missing.request_duration_ms.is_empty());
}

/// 测试：URI 重建使用实例的协议、主机和端口，保留路径和查询串
#[test]
fn test_reconstruct_uri() {
    let secure = ServiceInstance::new("svc", "node-0", "10.0.0.1", 8443).with_secure(true);
    let plain = ServiceInstance::new("svc", "node-1", "10.0.0.2", 8080);

    let original: Uri = "http://svc/api/users?id=1".parse().unwrap();
    assert_eq!(
        reconstruct_uri(&secure, &original).unwrap().to_string(),
        "https://10.0.0.1:8443/api/users?id=1"
    );
    assert_eq!(
        reconstruct_uri(&plain, &original).unwrap().to_string(),
        "http://10.0.0.2:8080/api/users?id=1"
    );

    let websocket: Uri = "ws://svc/socket".parse().unwrap();
    assert_eq!(
        reconstruct_uri(&secure, &websocket).unwrap().to_string(),
        "wss://10.0.0.1:8443/socket"
    );
    assert_eq!(
        reconstruct_uri(&plain, &websocket).unwrap().to_string(),
        "ws://10.0.0.2:8080/socket"
    );
}

/// 测试：耗时样本只保留最近 1000 条
#[tokio::test]
async fn test_stats_duration_samples_capped() {
    let stats = StatsLoadBalancerLifecycle::new();
    let client = LoadBalancerClient::new(create_factory(), vec![Arc::new(stats.clone())]);

    for _ in 0..1005 {
        client
            .execute("svc", |_instance| async move { Ok::<_, BoxError>(1u32) })
            .await
            .unwrap();
    }

    let svc = stats.get_stats("svc");
    assert_eq!(svc.requests_total, 1005);
    assert_eq!(svc.request_duration_ms.len(), 1000);
}
