//! 轮询与随机负载均衡器测试

use std::collections::HashSet;
use std::sync::Arc;

use flare_loadbalancer_core::loadbalancer::{
    FixedServiceInstanceListSupplier, RandomLoadBalancer, ReactiveLoadBalancer, Request,
    Response, RoundRobinLoadBalancer,
};
use flare_loadbalancer_core::ServiceInstance;

/// 创建 n 个测试实例，实例 ID 为 node-0..node-(n-1)
fn create_instances(service_id: &str, n: usize) -> Vec<ServiceInstance> {
    (0..n)
        .map(|i| {
            ServiceInstance::new(service_id, format!("node-{}", i), "127.0.0.1", 8080 + i as u16)
        })
        .collect()
}

fn round_robin(instances: Vec<ServiceInstance>) -> RoundRobinLoadBalancer {
    RoundRobinLoadBalancer::new(Arc::new(FixedServiceInstanceListSupplier::new(
        "test-service",
        instances,
    )))
}

fn instance_id(response: &Response) -> String {
    response
        .server()
        .map(|instance| instance.instance_id.clone())
        .expect("expected a chosen instance")
}

/// 测试：N 次连续选择按列表顺序覆盖全部实例，从下标 0 开始
#[tokio::test]
async fn test_round_robin_visits_each_instance_in_order() {
    let lb = round_robin(create_instances("test-service", 4));
    let request = Request::default();

    let mut chosen = Vec::new();
    for _ in 0..8 {
        chosen.push(instance_id(&lb.choose(&request).await));
    }

    assert_eq!(
        chosen,
        vec!["node-0", "node-1", "node-2", "node-3", "node-0", "node-1", "node-2", "node-3"]
    );
}

/// 测试：空列表返回无实例，且不推进游标
#[tokio::test]
async fn test_round_robin_empty_list() {
    let lb = round_robin(Vec::new());

    let response = lb.choose(&Request::default()).await;

    assert!(!response.has_server());
    assert_eq!(response, Response::Empty);
    assert_eq!(lb.position(), -1);
}

/// 测试：多线程并发推进游标，不会拿到重复的值
#[test]
fn test_round_robin_cursor_no_duplicates_across_threads() {
    let lb = Arc::new(round_robin(Vec::new()));
    let threads = 8;
    let per_thread = 500;
    let size = threads * per_thread;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let lb = lb.clone();
            std::thread::spawn(move || {
                (0..per_thread)
                    .map(|_| lb.next_position(size).expect("size is non-zero"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for position in handle.join().expect("thread panicked") {
            assert!(seen.insert(position), "duplicate position {}", position);
        }
    }
    assert_eq!(seen.len(), size);
}

/// 测试：并发任务选择，M 个实例 M 个调用者各拿到不同实例
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_round_robin_concurrent_choose_distinct_instances() {
    let size = 32;
    let lb = Arc::new(round_robin(create_instances("test-service", size)));

    let handles: Vec<_> = (0..size)
        .map(|_| {
            let lb = lb.clone();
            tokio::spawn(async move { instance_id(&lb.choose(&Request::default()).await) })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let id = handle.await.expect("task panicked");
        assert!(seen.insert(id.clone()), "instance {} chosen twice", id);
    }
    assert_eq!(seen.len(), size);
}

/// 测试：取模使用的是当时观察到的大小，列表缩小后旧下标会越界（不做钳制）
#[test]
fn test_round_robin_stale_modulo_after_shrink() {
    let lb = round_robin(Vec::new());

    for expected in 0..4 {
        assert_eq!(lb.next_position(5), Some(expected));
    }
    let stale = lb.next_position(5).expect("size is non-zero");
    assert_eq!(stale, 4);

    let shrunk = create_instances("test-service", 2);
    assert!(shrunk.get(stale).is_none(), "stale index is outside the shrunk list");

    // 下一次按新的大小取模，重新落回范围内
    let next = lb.next_position(shrunk.len()).expect("size is non-zero");
    assert_eq!(next, 1);
    assert!(shrunk.get(next).is_some());
}

/// 测试：随机策略空列表返回无实例
#[tokio::test]
async fn test_random_empty_list() {
    let lb = RandomLoadBalancer::new(Arc::new(FixedServiceInstanceListSupplier::new(
        "test-service",
        Vec::new(),
    )));

    let response = lb.choose(&Request::default()).await;

    assert!(!response.has_server());
}

/// 测试：随机策略只返回列表中的实例，并且足够多次后覆盖全部实例
#[tokio::test]
async fn test_random_covers_all_instances() {
    let instances = create_instances("test-service", 3);
    let lb = RandomLoadBalancer::with_seed(
        Arc::new(FixedServiceInstanceListSupplier::new("test-service", instances.clone())),
        42,
    );

    let mut seen = HashSet::new();
    for _ in 0..300 {
        let response = lb.choose(&Request::default()).await;
        let chosen = response.server().expect("expected a chosen instance");
        assert!(instances.contains(chosen));
        seen.insert(chosen.instance_id.clone());
    }

    assert_eq!(seen.len(), 3);
}

/// 测试：相同种子得到相同序列
#[tokio::test]
async fn test_random_seeded_is_reproducible() {
    let instances = create_instances("test-service", 5);
    let supplier = Arc::new(FixedServiceInstanceListSupplier::new("test-service", instances));
    let a = RandomLoadBalancer::with_seed(supplier.clone(), 7);
    let b = RandomLoadBalancer::with_seed(supplier, 7);

    for _ in 0..20 {
        let request = Request::default();
        assert_eq!(a.choose(&request).await, b.choose(&request).await);
    }
}

/// 测试：大小为 0 时游标不推进
#[test]
fn test_round_robin_next_position_zero_size() {
    let lb = round_robin(Vec::new());

    assert_eq!(lb.next_position(0), None);
    assert_eq!(lb.position(), -1);
    assert_eq!(lb.next_position(3), Some(0));
}
