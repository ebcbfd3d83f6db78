//! 竞速组合：取第一个产出值的流
//!
//! 每个候选流一个 tokio 任务；第一个产出值的候选通过原子槽位成为赢家，
//! 其余候选的取消令牌立即被触发。之后只转发赢家的值、错误和完成信号。

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::Result;

const NO_WINNER: usize = usize::MAX;

/// 下游缓冲大小；赢家在缓冲满时等待，需求只传递给赢家
const RACE_BUFFER: usize = 16;

/// 组合多个候选流，转发第一个产出值的流的全部信号
///
/// 没有候选时返回立即完成的空流。所有候选都未产出值就结束（包括出错）时，
/// 结果为空流。返回的流需要在 tokio 运行时中被轮询。
pub fn first_with_value<T>(
    sources: Vec<BoxStream<'static, Result<T>>>,
) -> BoxStream<'static, Result<T>>
where
    T: Send + 'static,
{
    if sources.is_empty() {
        return stream::empty().boxed();
    }
    FirstWithValue {
        state: RaceState::Idle(sources),
    }
    .boxed()
}

struct FirstWithValue<T> {
    state: RaceState<T>,
}

enum RaceState<T> {
    /// 尚未订阅
    Idle(Vec<BoxStream<'static, Result<T>>>),
    /// 候选任务已启动；丢弃时取消所有候选
    Running {
        rx: ReceiverStream<Result<T>>,
        _guard: DropGuard,
    },
    Done,
}

impl<T> Stream for FirstWithValue<T>
where
    T: Send + 'static,
{
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let RaceState::Idle(sources) = &mut this.state {
            let sources = std::mem::take(sources);
            this.state = start_race(sources);
        }

        match &mut this.state {
            RaceState::Running { rx, .. } => match Pin::new(rx).poll_next(cx) {
                Poll::Ready(None) => {
                    this.state = RaceState::Done;
                    Poll::Ready(None)
                }
                other => other,
            },
            _ => Poll::Ready(None),
        }
    }
}

fn start_race<T>(sources: Vec<BoxStream<'static, Result<T>>>) -> RaceState<T>
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(RACE_BUFFER);
    let root = CancellationToken::new();
    let tokens: Arc<Vec<CancellationToken>> =
        Arc::new(sources.iter().map(|_| root.child_token()).collect());
    let winner = Arc::new(AtomicUsize::new(NO_WINNER));

    for (index, source) in sources.into_iter().enumerate() {
        let candidate = Candidate {
            index,
            tx: tx.clone(),
            tokens: tokens.clone(),
            winner: winner.clone(),
        };
        tokio::spawn(candidate.run(source));
    }

    RaceState::Running {
        rx: ReceiverStream::new(rx),
        _guard: root.drop_guard(),
    }
}

struct Candidate<T> {
    index: usize,
    tx: mpsc::Sender<Result<T>>,
    tokens: Arc<Vec<CancellationToken>>,
    winner: Arc<AtomicUsize>,
}

impl<T> Candidate<T>
where
    T: Send + 'static,
{
    async fn run(self, mut source: BoxStream<'static, Result<T>>) {
        let token = self.tokens[self.index].clone();

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(candidate = self.index, "Race candidate cancelled");
                    return;
                }
                next = source.next() => next,
            };

            match next {
                Some(Ok(value)) => {
                    if !self.claim() {
                        return;
                    }
                    if !self.forward(&token, Ok(value)).await {
                        return;
                    }
                }
                Some(Err(err)) => {
                    if self.is_winner() {
                        self.forward(&token, Err(err)).await;
                    } else {
                        tracing::debug!(
                            candidate = self.index,
                            error = %err,
                            "Discarding error from race candidate"
                        );
                    }
                    return;
                }
                None => return,
            }
        }
    }

    /// 尝试成为赢家；已经是赢家时同样返回 true
    fn claim(&self) -> bool {
        match self
            .winner
            .compare_exchange(NO_WINNER, self.index, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::debug!(candidate = self.index, "Race winner decided");
                for (index, token) in self.tokens.iter().enumerate() {
                    if index != self.index {
                        token.cancel();
                    }
                }
                true
            }
            Err(current) => current == self.index,
        }
    }

    fn is_winner(&self) -> bool {
        self.winner.load(Ordering::Acquire) == self.index
    }

    async fn forward(&self, token: &CancellationToken, item: Result<T>) -> bool {
        tokio::select! {
            biased;
            _ = token.cancelled() => false,
            sent = self.tx.send(item) => sent.is_ok(),
        }
    }
}
