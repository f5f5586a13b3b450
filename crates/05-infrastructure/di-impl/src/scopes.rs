//! 作用域表与线程当前作用域指针

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use di_abstractions::Registration;
use infrastructure_common::{ScopeId, ScopeInfo};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

/// 单个作用域的本地注册表
#[derive(Debug)]
struct ScopeTable {
    entries: HashMap<String, Registration>,
    created_at: DateTime<Utc>,
}

impl ScopeTable {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}

/// 作用域表集合
///
/// 对单个作用域的写入在持有该作用域分片锁期间完成，
/// 因此与并发的 `clear` 不会交错出半截状态。
#[derive(Debug)]
pub(crate) struct ScopeTables {
    tables: DashMap<ScopeId, ScopeTable>,
}

impl ScopeTables {
    pub(crate) fn new() -> Self {
        let tables = DashMap::new();
        tables.insert(ScopeId::root(), ScopeTable::new());
        Self { tables }
    }

    /// 创建空表，已存在则替换；返回是否替换了旧表
    pub(crate) fn create(&self, scope: &ScopeId) -> bool {
        self.tables.insert(scope.clone(), ScopeTable::new()).is_some()
    }

    /// 写入一项，返回被覆盖的旧值
    pub(crate) fn insert(
        &self,
        scope: &ScopeId,
        key: &str,
        registration: Registration,
    ) -> Option<Registration> {
        self.tables
            .entry(scope.clone())
            .or_insert_with(ScopeTable::new)
            .entries
            .insert(key.to_string(), registration)
    }

    /// 查找本地项；作用域不存在视为没有本地项
    pub(crate) fn lookup(&self, scope: &ScopeId, key: &str) -> Option<Registration> {
        self.tables
            .get(scope.as_str())
            .and_then(|table| table.entries.get(key).cloned())
    }

    /// 删除作用域表；根作用域只清空不删除
    pub(crate) fn remove(&self, scope: &ScopeId) -> bool {
        if scope.is_root() {
            self.tables.insert(ScopeId::root(), ScopeTable::new());
            return true;
        }
        self.tables.remove(scope.as_str()).is_some()
    }

    pub(crate) fn contains(&self, scope: &ScopeId) -> bool {
        self.tables.contains_key(scope.as_str())
    }

    pub(crate) fn ids(&self) -> Vec<ScopeId> {
        let mut ids: Vec<ScopeId> = self.tables.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub(crate) fn info(&self, scope: &ScopeId) -> Option<ScopeInfo> {
        self.tables.get(scope.as_str()).map(|table| ScopeInfo {
            id: scope.clone(),
            entries: table.entries.len(),
            created_at: table.created_at,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }
}

/// 每个线程的当前作用域指针
///
/// 每个线程只写自己的槽位；只有 `reset_matching` 会改动其他线程的槽位。
/// 线程退出时其槽位随线程局部的 [`ExitGuard`] 一起释放。
#[derive(Debug, Default)]
pub(crate) struct CurrentScopes {
    pointers: Arc<PointerMap>,
}

type PointerMap = DashMap<ThreadId, ScopeId>;

impl CurrentScopes {
    pub(crate) fn current(&self) -> ScopeId {
        self.pointers
            .get(&thread::current().id())
            .map(|scope| scope.value().clone())
            .unwrap_or_default()
    }

    pub(crate) fn set(&self, scope: &ScopeId) {
        self.pointers.insert(thread::current().id(), scope.clone());
        // 线程局部存储正在销毁时无法登记，槽位只能等显式释放
        let _ = EXIT_GUARD.try_with(|guard| guard.borrow_mut().track(&self.pointers));
    }

    /// 把指向 `scope` 的指针都重置为根作用域，返回重置的数量
    pub(crate) fn reset_matching(&self, scope: &ScopeId) -> usize {
        let mut reset = 0;
        for mut pointer in self.pointers.iter_mut() {
            if pointer.value() == scope {
                *pointer.value_mut() = ScopeId::root();
                reset += 1;
            }
        }
        reset
    }

    pub(crate) fn release(&self) {
        self.pointers.remove(&thread::current().id());
    }

    /// 当前占用的槽位数量
    pub(crate) fn len(&self) -> usize {
        self.pointers.len()
    }
}

thread_local! {
    static EXIT_GUARD: RefCell<ExitGuard> = RefCell::new(ExitGuard::new());
}

/// 线程退出时从登记过的指针表中移除本线程的槽位
struct ExitGuard {
    thread: ThreadId,
    maps: Vec<Weak<PointerMap>>,
}

impl ExitGuard {
    fn new() -> Self {
        Self {
            thread: thread::current().id(),
            maps: Vec::new(),
        }
    }

    fn track(&mut self, pointers: &Arc<PointerMap>) {
        let weak = Arc::downgrade(pointers);
        // 顺带丢掉已销毁容器的登记
        self.maps.retain(|map| map.strong_count() > 0);
        if !self.maps.iter().any(|map| map.ptr_eq(&weak)) {
            self.maps.push(weak);
        }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        for map in self.maps.drain(..) {
            if let Some(pointers) = map.upgrade() {
                pointers.remove(&self.thread);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exited_threads_release_their_pointers() {
        let current = Arc::new(CurrentScopes::default());

        for i in 0..200 {
            let current = current.clone();
            thread::spawn(move || {
                current.set(&ScopeId::new(format!("s{}", i)));
                assert_eq!(current.current(), ScopeId::new(format!("s{}", i)));
            })
            .join()
            .unwrap();
        }

        assert_eq!(current.len(), 0);
    }

    #[test]
    fn test_live_thread_keeps_its_pointer() {
        let current = CurrentScopes::default();
        current.set(&ScopeId::new("s"));
        current.set(&ScopeId::new("t"));
        assert_eq!(current.len(), 1);
        assert_eq!(current.current(), ScopeId::new("t"));

        current.release();
        assert_eq!(current.len(), 0);
        assert!(current.current().is_root());
    }

    #[test]
    fn test_pointer_slot_outlives_dropped_container() {
        // 容器先于线程销毁时，线程退出不应触碰已释放的表
        let handle = thread::spawn(|| {
            let current = CurrentScopes::default();
            current.set(&ScopeId::new("short-lived"));
            drop(current);

            let other = CurrentScopes::default();
            other.set(&ScopeId::new("other"));
            other.len()
        });
        assert_eq!(handle.join().unwrap(), 1);
    }

    #[test]
    fn test_reset_matching_only_touches_cleared_scope() {
        let current = Arc::new(CurrentScopes::default());
        let barrier = Arc::new(std::sync::Barrier::new(3));

        let workers: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|name| {
                let current = current.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    current.set(&ScopeId::new(name));
                    barrier.wait();
                    // 等主线程重置
                    barrier.wait();
                    current.current()
                })
            })
            .collect();

        barrier.wait();
        assert_eq!(current.reset_matching(&ScopeId::new("a")), 1);
        barrier.wait();

        let seen: Vec<ScopeId> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert_eq!(seen, vec![ScopeId::root(), ScopeId::new("b")]);
        assert_eq!(current.len(), 0);
    }
}
