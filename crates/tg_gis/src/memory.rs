// crates/tg_gis/src/memory.rs

//! 内存工作区
//!
//! [`GeoWorkspace`] 的内存实现：数据集保存在进程内的哈希表中，
//! 可整体持久化为目录下的 JSON 文件。地理处理操作基于 tg_geo
//! 的平面几何算法实现。

use crate::env::GisEnv;
use crate::field::{FieldType, FieldValue};
use crate::table::FieldDef;
use crate::table::{Feature, FeatureTable};
use crate::workspace::{Dataset, GeoWorkspace};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tg_foundation::{require, TgError, TgResult};
use tg_geo::{clip, BoundingBox, MultiPolygon, Point2D, Polygon, SpatialIndex};
use tg_raster::{ElevationGrid, GridTemplate, ZoneGrid};
use tracing::debug;

/// 内存工作区
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    env: GisEnv,
    datasets: RwLock<HashMap<String, Dataset>>,
}

impl MemoryWorkspace {
    /// 创建空工作区
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: GisEnv::new(),
            datasets: RwLock::new(HashMap::new()),
        }
    }

    /// 创建带可用许可扩展的工作区
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            env: GisEnv::with_extensions(extensions),
            datasets: RwLock::new(HashMap::new()),
        }
    }

    /// 数据集数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.read().is_empty()
    }

    /// 从目录加载工作区
    ///
    /// 目录下每个 `.json` 文件是一个数据集，文件名（去扩展名）为数据集名。
    pub fn load_dir(dir: impl AsRef<Path>) -> TgResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(TgError::file_not_found(dir));
        }
        let ws = Self::new();
        {
            let mut datasets = ws.datasets.write();
            for entry in std::fs::read_dir(dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    let name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or_default()
                        .to_string();
                    let json = std::fs::read_to_string(&path)?;
                    let dataset: Dataset = serde_json::from_str(&json)
                        .map_err(|e| TgError::serialization(format!("{}: {e}", path.display())))?;
                    datasets.insert(name, dataset);
                }
            }
        }
        debug!(count = ws.len(), dir = %dir.display(), "工作区已加载");
        Ok(ws)
    }

    /// 把工作区全部数据集写入目录
    pub fn save_dir(&self, dir: impl AsRef<Path>) -> TgResult<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let datasets = self.datasets.read();
        for (name, dataset) in datasets.iter() {
            let json = serde_json::to_string_pretty(dataset)
                .map_err(|e| TgError::serialization(e.to_string()))?;
            std::fs::write(dir.join(format!("{name}.json")), json)?;
        }
        debug!(count = datasets.len(), dir = %dir.display(), "工作区已保存");
        Ok(())
    }
}

/// 多图层字段并集，按首次出现的定义
fn union_fields(layers: &[&FeatureTable]) -> Vec<FieldDef> {
    let mut fields: Vec<FieldDef> = Vec::new();
    for layer in layers {
        for def in &layer.fields {
            if !fields.iter().any(|f| f.name == def.name) {
                fields.push(def.clone());
            }
        }
    }
    fields
}

/// 合并两组属性，左侧同名字段优先
fn merge_attributes(
    left: &BTreeMap<String, FieldValue>,
    right: &BTreeMap<String, FieldValue>,
) -> BTreeMap<String, FieldValue> {
    let mut merged = right.clone();
    for (k, v) in left {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

impl GeoWorkspace for MemoryWorkspace {
    fn env(&self) -> &GisEnv {
        &self.env
    }

    fn exists(&self, name: &str) -> bool {
        self.datasets.read().contains_key(name)
    }

    fn fetch(&self, name: &str) -> TgResult<Dataset> {
        self.datasets
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| TgError::data_not_found(name))
    }

    fn store(&self, name: &str, data: Dataset) -> TgResult<()> {
        let mut datasets = self.datasets.write();
        if datasets.contains_key(name) && !self.env.overwrite() {
            return Err(TgError::output_exists(name));
        }
        debug!(name, kind = data.kind().as_str(), "数据集已写入");
        datasets.insert(name.to_string(), data);
        Ok(())
    }

    fn delete(&self, name: &str) -> TgResult<()> {
        self.datasets.write().remove(name);
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn polygons_to_raster(
        &self,
        table: &FeatureTable,
        id_field: &str,
        cell_size: f64,
    ) -> TgResult<ZoneGrid> {
        table.check_fields(true, &[id_field])?;
        let def = table.field(id_field).unwrap_or_else(|| unreachable!());
        if def.ftype != FieldType::Long {
            return Err(TgError::field_type_mismatch(
                &table.name,
                id_field,
                FieldType::Long.as_str(),
                def.ftype.as_str(),
            ));
        }

        let (min_x, min_y, max_x, max_y) = require!(
            table
                .features
                .iter()
                .filter_map(|f| f.geometry.bounds())
                .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))),
            TgError::invalid_input(format!("图层 {} 没有有效几何", table.name))
        );

        // 原点对齐到像元大小的整倍数，保证不同图层栅格化结果可对齐
        let origin = Point2D::new(
            (min_x / cell_size).floor() * cell_size,
            (min_y / cell_size).floor() * cell_size,
        );
        let width = (((max_x - origin.x) / cell_size).ceil() as usize).max(1);
        let height = (((max_y - origin.y) / cell_size).ceil() as usize).max(1);
        let template = GridTemplate::new(origin, cell_size, width, height)?;

        let mut index: SpatialIndex<usize> = SpatialIndex::new();
        for (i, feat) in table.features.iter().enumerate() {
            if let Some(bounds) = feat.geometry.bounds() {
                index.insert(BoundingBox::from_tuple(bounds), i);
            }
        }

        let mut out = ZoneGrid::zeros(template);
        for row in 0..height {
            for col in 0..width {
                let center = template.cell_center(row, col);
                let probe = BoundingBox::new(center.x, center.y, center.x, center.y);
                let mut candidates = index.query(&probe);
                candidates.sort();
                for &i in candidates {
                    let feat = &table.features[i];
                    if feat.geometry.contains_point(&center) {
                        let id = require!(
                            feat.attr(id_field).and_then(FieldValue::as_i64),
                            TgError::field_not_found(&table.name, id_field)
                        );
                        out.set(row, col, id as i32);
                        break;
                    }
                }
            }
        }
        Ok(out)
    }

    fn clip_raster(
        &self,
        elevation: &ElevationGrid,
        template: &GridTemplate,
    ) -> TgResult<ElevationGrid> {
        let mut out = ElevationGrid::filled(*template);
        for row in 0..template.height {
            for col in 0..template.width {
                let center = template.cell_center(row, col);
                if let Some((src_row, src_col)) = elevation.template.cell_at(center) {
                    if let Some(value) = elevation.get(src_row, src_col) {
                        out.set(row, col, value);
                    }
                }
            }
        }
        Ok(out)
    }

    fn raster_to_polygons(
        &self,
        zones: &ZoneGrid,
        value_field: &str,
        simplify: bool,
    ) -> TgResult<FeatureTable> {
        // 行内连段: (起始行, 结束行, 起始列, 结束列, 值)
        let mut runs: Vec<(usize, usize, usize, usize, i32)> = Vec::new();
        let (height, width) = zones.shape();
        for row in 0..height {
            let mut col = 0;
            while col < width {
                let value = zones.get(row, col).unwrap_or(0);
                if value <= 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < width && zones.get(row, col) == Some(value) {
                    col += 1;
                }
                runs.push((row, row, start, col - 1, value));
            }
        }

        if simplify {
            // 合并垂直相邻的等宽同值连段
            let mut merged: Vec<(usize, usize, usize, usize, i32)> = Vec::new();
            for run in runs {
                if let Some(prev) = merged.iter_mut().find(|p| {
                    p.1 + 1 == run.0 && p.2 == run.2 && p.3 == run.3 && p.4 == run.4
                }) {
                    prev.1 = run.1;
                } else {
                    merged.push(run);
                }
            }
            runs = merged;
        }

        let mut table = FeatureTable::with_fields(
            "polygons",
            vec![FieldDef::new(value_field, FieldType::Long)],
        );
        for (row0, row1, col0, col1, value) in runs {
            // row1 在下方，y 更小
            let (min_x, min_y, _, _) = zones.template.cell_bounds(row1, col0);
            let (_, _, max_x, max_y) = zones.template.cell_bounds(row0, col1);
            table.push(
                Feature::new(MultiPolygon::from_polygon(Polygon::rect(
                    min_x, min_y, max_x, max_y,
                )))
                .with_attr(value_field, i64::from(value)),
            );
        }
        Ok(table)
    }

    fn dissolve(&self, table: &FeatureTable, by_field: &str) -> TgResult<FeatureTable> {
        table.check_fields(true, &[by_field])?;
        let def = table.field(by_field).unwrap_or_else(|| unreachable!());

        let mut groups: BTreeMap<FieldValue, MultiPolygon> = BTreeMap::new();
        for feat in &table.features {
            let key = require!(
                feat.attr(by_field).cloned(),
                TgError::field_not_found(&table.name, by_field)
            );
            groups
                .entry(key)
                .or_insert_with(MultiPolygon::empty)
                .extend(feat.geometry.clone());
        }

        let mut out = FeatureTable::with_fields(&table.name, vec![def.clone()]);
        for (key, geometry) in groups {
            out.push(Feature::new(geometry).with_attr(by_field, key));
        }
        Ok(out)
    }

    fn intersect(&self, layers: &[&FeatureTable], out_name: &str) -> TgResult<FeatureTable> {
        let (first, rest) = require!(
            layers.split_first(),
            TgError::invalid_input("图层求交至少需要一个输入图层")
        );

        let mut acc: Vec<Feature> = first.features.clone();
        for layer in rest {
            let mut index: SpatialIndex<usize> = SpatialIndex::new();
            for (i, feat) in layer.features.iter().enumerate() {
                if let Some(bounds) = feat.geometry.bounds() {
                    index.insert(BoundingBox::from_tuple(bounds), i);
                }
            }

            let mut next: Vec<Feature> = Vec::new();
            for a in &acc {
                let Some(bounds) = a.geometry.bounds() else {
                    continue;
                };
                let mut candidates = index.query(&BoundingBox::from_tuple(bounds));
                candidates.sort();
                for &i in candidates {
                    let b = &layer.features[i];
                    let pieces = clip::intersection(&a.geometry, &b.geometry)?;
                    if pieces.is_empty() {
                        continue;
                    }
                    next.push(Feature {
                        geometry: pieces,
                        attributes: merge_attributes(&a.attributes, &b.attributes),
                    });
                }
            }
            acc = next;
        }

        let mut out = FeatureTable::with_fields(out_name, union_fields(layers));
        out.features = acc;
        Ok(out)
    }

    fn merge(&self, layers: &[&FeatureTable], out_name: &str) -> TgResult<FeatureTable> {
        let mut out = FeatureTable::with_fields(out_name, union_fields(layers));
        for layer in layers {
            out.features.extend(layer.features.iter().cloned());
        }
        Ok(out)
    }

    fn spatial_join(
        &self,
        target: &FeatureTable,
        join: &FeatureTable,
        out_name: &str,
    ) -> TgResult<FeatureTable> {
        let mut index: SpatialIndex<usize> = SpatialIndex::new();
        for (i, feat) in join.features.iter().enumerate() {
            if let Some(bounds) = feat.geometry.bounds() {
                index.insert(BoundingBox::from_tuple(bounds), i);
            }
        }

        let mut out = FeatureTable::with_fields(out_name, union_fields(&[target, join]));
        for feat in &target.features {
            let Some(bounds) = feat.geometry.bounds() else {
                continue;
            };
            let mut candidates = index.query(&BoundingBox::from_tuple(bounds));
            candidates.sort();
            for &i in candidates {
                let other = &join.features[i];
                if feat.geometry.intersects(&other.geometry) {
                    out.push(Feature {
                        geometry: feat.geometry.clone(),
                        attributes: merge_attributes(&feat.attributes, &other.attributes),
                    });
                }
            }
        }
        Ok(out)
    }
}
