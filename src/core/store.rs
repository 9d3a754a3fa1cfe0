use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: RefCell<Rc<T>>,
    subscribers: RefCell<Vec<(u64, Observer<T>)>>,
    // 待送出的 (訂閱者, 值)，由最外層的 set 依序送完
    pending: RefCell<VecDeque<(Observer<T>, Rc<T>)>>,
    dispatching: Cell<bool>,
    next_id: Cell<u64>,
}

/// 可訂閱的共享狀態容器 (single-threaded)
///
/// Clone 出來的 handle 共用同一份狀態；每次 `Writable::new` 則是獨立的 store。
/// 型別本身是 `!Send`，所以只能在建立它的執行緒上使用。
pub struct Writable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Writable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(Rc::new(initial)),
                subscribers: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
                next_id: Cell::new(0),
            }),
        }
    }

    /// 取得目前的值 (不會觸發通知)
    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.inner.value.borrow())
    }

    /// 整個替換目前的值，並同步通知所有訂閱者
    pub fn set(&self, value: T) {
        self.replace(Rc::new(value));
    }

    /// 以 `transform(current)` 的結果替換目前的值
    ///
    /// transform 若 panic，store 維持原值。
    pub fn update<F>(&self, transform: F)
    where
        F: FnOnce(&T) -> T,
    {
        let current = self.get();
        let next = transform(&*current);
        drop(current);
        self.set(next);
    }

    /// `update` 的可失敗版本：transform 回傳的錯誤原封不動地傳回給呼叫端，
    /// 且 store 維持原值。
    pub fn try_update<F, E>(&self, transform: F) -> Result<(), E>
    where
        F: FnOnce(&T) -> Result<T, E>,
    {
        let current = self.get();
        let next = transform(&*current)?;
        drop(current);
        self.set(next);
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn replace(&self, value: Rc<T>) {
        let previous = self.inner.value.replace(Rc::clone(&value));
        // 舊值在 borrow 釋放後才 drop
        drop(previous);

        {
            let subscribers = self.inner.subscribers.borrow();
            let mut pending = self.inner.pending.borrow_mut();
            pending.extend(
                subscribers
                    .iter()
                    .map(|(_, observer)| (Rc::clone(observer), Rc::clone(&value))),
            );
            tracing::trace!(
                subscribers = subscribers.len(),
                pending = pending.len(),
                "Queued store change"
            );
        }

        // 通知途中的 set 只排隊，交給外層依序送出
        if self.inner.dispatching.get() {
            return;
        }

        let _dispatch = DispatchGuard::enter(&self.inner);
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            let Some((observer, value)) = next else {
                break;
            };
            observer(&*value);
        }
    }
}

struct DispatchGuard<'a, T> {
    inner: &'a Inner<T>,
}

impl<'a, T> DispatchGuard<'a, T> {
    fn enter(inner: &'a Inner<T>) -> Self {
        inner.dispatching.set(true);
        Self { inner }
    }
}

impl<T> Drop for DispatchGuard<'_, T> {
    fn drop(&mut self) {
        // 訂閱者 panic 時丟掉剩下的通知，store 仍可繼續使用
        self.inner.pending.borrow_mut().clear();
        self.inner.dispatching.set(false);
    }
}

impl<T: 'static> Writable<T> {
    /// 註冊訂閱者並立即以目前的值呼叫它一次
    ///
    /// 回傳的 [`Unsubscriber`] 用來取消訂閱；只 drop 它不會取消。
    pub fn subscribe<F>(&self, observer: F) -> Unsubscriber
    where
        F: Fn(&T) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let observer: Observer<T> = Rc::new(observer);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::clone(&observer)));
        tracing::debug!(subscriber = id, "Store subscriber registered");

        observer(&*self.get());

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Unsubscriber {
            remove: Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .subscribers
                        .borrow_mut()
                        .retain(|(existing, _)| *existing != id);
                    tracing::debug!(subscriber = id, "Store subscriber removed");
                }
            }),
        }
    }
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("value", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// 取消訂閱的 handle
#[must_use = "dropping an Unsubscriber leaves the observer registered"]
pub struct Unsubscriber {
    remove: Box<dyn FnOnce()>,
}

impl Unsubscriber {
    pub fn unsubscribe(self) {
        (self.remove)();
    }
}

impl fmt::Debug for Unsubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscriber").finish_non_exhaustive()
    }
}
