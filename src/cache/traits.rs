use async_trait::async_trait;

/// 缓存查询结果
///
/// 区分"键不存在"和"键存在但取值失败"两种情况，
/// 后者通常意味着后端连接异常或序列化数据损坏。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    /// 命中，返回缓存值
    Found(T),
    /// 键不存在
    NotFound,
    /// 键可能存在但无法取值（如后端连接失败）
    ExistsButNoValue,
}

/// 对象缓存统一接口
///
/// 所有缓存后端（内存、Redis 等）都实现此 trait，
/// 值以 JSON 字符串形式存取，由调用方负责序列化。
#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// 获取原始字符串值
    async fn get_raw(&self, key: &str) -> CacheResult<String>;

    /// 插入原始字符串值
    ///
    /// `ttl` 为 0 时使用后端的默认过期时间。
    async fn insert_raw(&self, key: String, value: String, ttl: u64);

    /// 删除指定键
    async fn remove(&self, key: &str);

    /// 清空所有缓存项
    async fn invalidate_all(&self);
}
