//! Racing futures against each other.
//!
//! Branches are polled in argument order, and the losers are dropped as soon
//! as one branch completes, which cancels them.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<A, B> {
    Left(A),
    Right(B),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either3<A, B, C> {
    First(A),
    Second(B),
    Third(C),
}

pub struct Race<A: Future, B: Future> {
    a: Pin<Box<A>>,
    b: Pin<Box<B>>,
}

pub fn race<A: Future, B: Future>(a: A, b: B) -> Race<A, B> {
    Race {
        a: Box::pin(a),
        b: Box::pin(b),
    }
}

impl<A: Future, B: Future> Future for Race<A, B> {
    type Output = Either<A::Output, B::Output>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Poll::Ready(value) = self.a.as_mut().poll(cx) {
            return Poll::Ready(Either::Left(value));
        }
        if let Poll::Ready(value) = self.b.as_mut().poll(cx) {
            return Poll::Ready(Either::Right(value));
        }
        Poll::Pending
    }
}

pub struct Race3<A: Future, B: Future, C: Future> {
    a: Pin<Box<A>>,
    b: Pin<Box<B>>,
    c: Pin<Box<C>>,
}

pub fn race3<A: Future, B: Future, C: Future>(a: A, b: B, c: C) -> Race3<A, B, C> {
    Race3 {
        a: Box::pin(a),
        b: Box::pin(b),
        c: Box::pin(c),
    }
}

impl<A: Future, B: Future, C: Future> Future for Race3<A, B, C> {
    type Output = Either3<A::Output, B::Output, C::Output>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Poll::Ready(value) = self.a.as_mut().poll(cx) {
            return Poll::Ready(Either3::First(value));
        }
        if let Poll::Ready(value) = self.b.as_mut().poll(cx) {
            return Poll::Ready(Either3::Second(value));
        }
        if let Poll::Ready(value) = self.c.as_mut().poll(cx) {
            return Poll::Ready(Either3::Third(value));
        }
        Poll::Pending
    }
}

/// Runs `body` until `cancel` completes.
///
/// Returns `None` when `cancel` won and `body` was dropped mid-flight.
pub async fn move_on_when<C, F>(cancel: C, body: F) -> Option<F::Output>
where
    C: Future,
    F: Future,
{
    match race(cancel, body).await {
        Either::Left(_) => None,
        Either::Right(value) => Some(value),
    }
}

/// Never completes. Useful as a losing branch.
pub fn pending<T>() -> std::future::Pending<T> {
    std::future::pending()
}
