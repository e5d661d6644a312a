//! 路由前缀树
//!
//! 每个节点有三部分：字面量子节点、按模式名称索引的子节点，以及叶子槽。
//! 叶子槽就是“路径结束”标记，中间节点永远不会被当作完整路由匹配。

use std::collections::HashMap;

use regex::Regex;

use super::callback::Callback;
use crate::constants::PATTERN_TOKEN_PREFIX;

#[derive(Debug, Clone, Default)]
pub(crate) struct RouteNode {
    literals: HashMap<String, RouteNode>,
    patterns: HashMap<String, RouteNode>,
    leaf: Option<Callback>,
}

impl RouteNode {
    /// 在路径段序列的末尾存放回调，返回被替换掉的旧回调
    ///
    /// 以 `:` 开头的段是模式占位符
    pub(crate) fn insert(&mut self, segments: &[String], callback: Callback) -> Option<Callback> {
        let mut node = self;
        for segment in segments {
            node = match segment.strip_prefix(PATTERN_TOKEN_PREFIX) {
                Some(name) => node.patterns.entry(name.to_string()).or_default(),
                None => node.literals.entry(segment.clone()).or_default(),
            };
        }
        node.leaf.replace(callback)
    }

    /// 逐段匹配请求路径
    ///
    /// 每一层先找字面量，找不到再按 `patterns` 的顺序尝试模式，第一个匹配的胜出，
    /// 不回溯。成功时返回回调和按顺序捕获的路径段。
    pub(crate) fn find<'a>(
        &'a self,
        segments: &[&str],
        patterns: &[(String, Regex)],
    ) -> Option<(&'a Callback, Vec<String>)> {
        let mut node = self;
        let mut captures = Vec::new();

        'segments: for segment in segments {
            if let Some(next) = node.literals.get(*segment) {
                node = next;
                continue;
            }

            for (name, regex) in patterns {
                let Some(next) = node.patterns.get(name) else {
                    continue;
                };
                if regex.is_match(segment) {
                    tracing::trace!(pattern = %name, segment = %segment, "Captured path segment");
                    node = next;
                    captures.push(segment.to_string());
                    continue 'segments;
                }
            }

            return None;
        }

        node.leaf.as_ref().map(|callback| (callback, captures))
    }

    /// 遍历所有已存放的回调及其路径段
    pub(crate) fn walk<'a>(&'a self, path: &mut Vec<String>, visit: &mut dyn FnMut(&[String], &'a Callback)) {
        if let Some(callback) = &self.leaf {
            visit(path, callback);
        }
        for (segment, child) in &self.literals {
            path.push(segment.clone());
            child.walk(path, visit);
            path.pop();
        }
        for (name, child) in &self.patterns {
            path.push(format!("{}{}", PATTERN_TOKEN_PREFIX, name));
            child.walk(path, visit);
            path.pop();
        }
    }
}
