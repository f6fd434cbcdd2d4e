//! 缓存层
//!
//! 提供基于插件注册机制的对象缓存抽象：
//! 各后端通过 [`declare_object_cache_plugin!`] 在启动前自注册到全局注册表，
//! 运行时根据配置中的 `cache.cache_type` 选择后端，失败时回退到内存缓存。

pub mod object_cache;
pub mod register;
pub mod traits;

pub use traits::{CacheResult, ObjectCache};

/// 声明并注册一个对象缓存插件
///
/// 在插件模块顶部调用，例如：
///
/// ```rust,ignore
/// declare_object_cache_plugin!("moka", MokaCacheWrapper);
/// ```
///
/// 宏会生成一个 `ctor` 构造函数，在 `main` 之前把插件构造器
/// 注册到全局注册表中。插件类型需要提供
/// `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:expr, $cache_type:ty) => {
        #[ctor::ctor]
        fn __register_object_cache_plugin() {
            let constructor: $crate::cache::register::ObjectCacheConstructor =
                ::std::sync::Arc::new(|| {
                    let fut: $crate::cache::register::BoxedObjectCacheFuture =
                        ::std::boxed::Box::pin(async {
                            let cache = <$cache_type>::new()
                                .map_err($crate::errors::AttendanceError::cache_connection)?;
                            let boxed: ::std::boxed::Box<dyn $crate::cache::traits::ObjectCache> =
                                ::std::boxed::Box::new(cache);
                            Ok(boxed)
                        });
                    fut
                });
            $crate::cache::register::register_object_cache_plugin($name, constructor);
        }
    };
}
